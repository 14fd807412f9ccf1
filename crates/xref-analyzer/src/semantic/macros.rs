use super::source::{FileRange, SourceFileId, TextRange};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MacroId(pub u32);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MacroDef {
    pub name: String,
    pub name_loc: FileRange,
}

/// A spelled macro name in the main file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MacroOccurrence {
    pub range: TextRange,
    pub macro_id: MacroId,
    pub is_definition: bool,
}

#[derive(Debug, Clone, Default)]
pub struct MacroTable {
    defs: Vec<MacroDef>,
    occurrences: Vec<MacroOccurrence>,
}

impl MacroTable {
    pub fn define(
        &mut self,
        def: MacroDef,
    ) -> MacroId {
        let is_main = def.name_loc.is_main();
        let range = def.name_loc.range;
        self.defs.push(def);
        let id = MacroId((self.defs.len() - 1) as u32);
        if is_main {
            self.occurrences.push(MacroOccurrence {
                range,
                macro_id: id,
                is_definition: true,
            });
        }
        id
    }

    pub fn reference(
        &mut self,
        macro_id: MacroId,
        range: TextRange,
    ) {
        self.occurrences.push(MacroOccurrence {
            range,
            macro_id,
            is_definition: false,
        });
    }

    pub(crate) fn sort(&mut self) {
        self.occurrences.sort_by_key(|occ| (occ.range, occ.is_definition));
    }

    pub fn def(
        &self,
        id: MacroId,
    ) -> Option<&MacroDef> {
        self.defs.get(id.0 as usize)
    }

    pub fn occurrences(&self) -> &[MacroOccurrence] {
        &self.occurrences
    }

    pub fn occurrences_of(
        &self,
        id: MacroId,
    ) -> impl Iterator<Item = &MacroOccurrence> {
        self.occurrences.iter().filter(move |occ| occ.macro_id == id)
    }

    pub fn is_expansion_start(
        &self,
        range: TextRange,
    ) -> bool {
        self.occurrences.iter().any(|occ| !occ.is_definition && occ.range == range)
    }

    /// Resolves the macro spelled by the identifier token at `range`.
    ///
    /// A recorded occurrence wins. Otherwise the latest definition with the same
    /// name that is visible at the token (another file, or earlier in the main file).
    pub fn locate(
        &self,
        range: TextRange,
        text: &str,
    ) -> Option<MacroId> {
        if let Some(occ) = self.occurrences.iter().find(|occ| occ.range == range) {
            return Some(occ.macro_id);
        }
        self.defs
            .iter()
            .enumerate()
            .filter(|(_, def)| def.name == text)
            .filter(|(_, def)| def.name_loc.file != SourceFileId::MAIN || def.name_loc.range.end <= range.start)
            .max_by_key(|(_, def)| (def.name_loc.file == SourceFileId::MAIN, def.name_loc.range.start))
            .map(|(idx, _)| MacroId(idx as u32))
    }
}
