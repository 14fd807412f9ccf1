    use super::*;
    use crate::index::SymbolId;
    use crate::resolve::{Reference, ReferenceAttributes};

    fn range(
        line: u32,
        start: u32,
        end: u32,
    ) -> IdeRange {
        IdeRange::new(IdePosition::new(line, start), IdePosition::new(line, end))
    }

    fn located(
        name: &str,
        declaration: IdeLocation,
        definition: Option<IdeLocation>,
    ) -> LocatedSymbol {
        LocatedSymbol {
            name: name.to_owned(),
            preferred_declaration: declaration,
            definition,
            id: None,
        }
    }

    #[test]
    fn positions_and_ranges_convert_both_ways() {
        let ide = range(3, 4, 9);
        let lsp = ide_range_to_lsp(ide);
        assert_eq!(lsp, Range::new(Position::new(3, 4), Position::new(3, 9)));
        assert_eq!(lsp_range_to_ide(lsp), ide);
    }

    #[test]
    fn locations_become_file_uris() {
        let location = IdeLocation::new("/xref/main.cpp", range(1, 2, 3));
        let lsp = ide_location_to_lsp(&location).expect("absolute path");
        assert_eq!(lsp.uri.as_str(), "file:///xref/main.cpp");
        assert_eq!(lsp.range.start, Position::new(1, 2));

        assert!(ide_location_to_lsp(&IdeLocation::new("relative.cpp", range(0, 0, 1))).is_none());
    }

    #[test]
    fn definitions_prefer_the_definition_location() {
        let declaration = IdeLocation::new("/xref/lib.h", range(0, 5, 8));
        let definition = IdeLocation::new("/xref/lib.cpp", range(4, 5, 8));
        let single = located_symbols_to_lsp(&[located("run", declaration.clone(), Some(definition))]);
        match single {
            Some(GotoDefinitionResponse::Scalar(location)) => {
                assert_eq!(location.uri.as_str(), "file:///xref/lib.cpp")
            },
            other => panic!("expected one location, got {other:?}"),
        }

        let several = located_symbols_to_lsp(&[
            located("a", declaration.clone(), None),
            located("b", IdeLocation::new("/xref/other.h", range(2, 0, 1)), None),
        ]);
        match several {
            Some(GotoDefinitionResponse::Array(locations)) => {
                assert_eq!(locations.len(), 2);
                assert_eq!(locations[0].uri.as_str(), "file:///xref/lib.h");
            },
            other => panic!("expected two locations, got {other:?}"),
        }

        assert!(located_symbols_to_lsp(&[]).is_none());
    }

    #[test]
    fn references_drop_unconvertible_locations() {
        let result = ReferencesResult {
            references: vec![
                Reference {
                    location: IdeLocation::new("/xref/main.cpp", range(0, 4, 7)),
                    container_name: None,
                    attributes: ReferenceAttributes::empty(),
                },
                Reference {
                    location: IdeLocation::new("not/absolute.cpp", range(1, 0, 3)),
                    container_name: None,
                    attributes: ReferenceAttributes::empty(),
                },
            ],
            has_more: false,
        };
        let locations = references_to_lsp(&result);
        assert_eq!(locations.len(), 1);
        assert_eq!(locations[0].range, ide_range_to_lsp(range(0, 4, 7)));
    }

    #[test]
    fn highlight_kinds_map_to_lsp() {
        let write = resolve::DocumentHighlight {
            range: range(0, 0, 1),
            kind: HighlightKind::Write,
        };
        assert_eq!(highlight_to_lsp(&write).kind, Some(DocumentHighlightKind::WRITE));
        let text = resolve::DocumentHighlight {
            range: range(0, 0, 1),
            kind: HighlightKind::Text,
        };
        assert_eq!(highlight_to_lsp(&text).kind, Some(DocumentHighlightKind::TEXT));
    }

    #[test]
    fn document_links_target_file_uris() {
        let link = resolve::DocumentLink {
            range: range(0, 9, 16),
            target: "/xref/lib.h".into(),
        };
        let lsp = document_link_to_lsp(&link);
        assert_eq!(lsp.target.map(|uri| uri.as_str().to_owned()), Some("file:///xref/lib.h".to_owned()));
        assert_eq!(lsp.range, ide_range_to_lsp(range(0, 9, 16)));
    }

    #[test]
    fn symbol_kinds_collapse_to_lsp_kinds() {
        assert_eq!(symbol_kind_to_lsp(IndexSymbolKind::Struct), SymbolKind::STRUCT);
        assert_eq!(symbol_kind_to_lsp(IndexSymbolKind::TypeAlias), SymbolKind::CLASS);
        assert_eq!(symbol_kind_to_lsp(IndexSymbolKind::Destructor), SymbolKind::METHOD);
        assert_eq!(symbol_kind_to_lsp(IndexSymbolKind::Using), SymbolKind::NAMESPACE);
        assert_eq!(symbol_kind_to_lsp(IndexSymbolKind::NonTypeTemplateParm), SymbolKind::TYPE_PARAMETER);
    }

    #[test]
    fn type_hierarchy_items_round_trip_their_resolve_data() {
        let item = resolve::TypeHierarchyItem {
            name: "Derived".to_owned(),
            detail: Some("ns::Derived".to_owned()),
            kind: IndexSymbolKind::Class,
            deprecated: true,
            uri: "file:///xref/main.cpp".to_owned(),
            range: range(2, 0, 20),
            selection_range: range(2, 6, 13),
            parents: None,
            children: None,
            data: ResolveParams {
                symbol_id: Some(SymbolId::from_usr("c:@N@ns@S@Derived")),
                parents: Some(vec![ResolveParams {
                    symbol_id: Some(SymbolId::from_usr("c:@N@ns@S@Base")),
                    parents: Some(Vec::new()),
                }]),
            },
        };
        let lsp = type_hierarchy_item_to_lsp(&item).expect("valid uri");
        assert_eq!(lsp.kind, SymbolKind::CLASS);
        assert_eq!(lsp.tags, Some(SymbolTag::DEPRECATED));

        let back = lsp_type_hierarchy_item_to_ide(&lsp).expect("data survives");
        assert_eq!(back.data, item.data);
        assert!(back.deprecated);
        assert_eq!(back.uri, item.uri);
        assert_eq!(back.selection_range, item.selection_range);

        let mut stripped = lsp;
        stripped.data = None;
        assert!(lsp_type_hierarchy_item_to_ide(&stripped).is_none());
    }

    #[test]
    fn call_hierarchy_items_carry_the_symbol_id_as_data() {
        let id = SymbolId::from_usr("c:@F@run#");
        let item = resolve::CallHierarchyItem {
            name: "run".to_owned(),
            detail: None,
            kind: IndexSymbolKind::Function,
            tags: Vec::new(),
            uri: "file:///xref/main.cpp".to_owned(),
            range: range(1, 0, 12),
            selection_range: range(1, 5, 8),
            data: id.to_hex(),
        };
        let lsp = call_hierarchy_item_to_lsp(&item).expect("valid uri");
        assert_eq!(lsp.data, Some(Value::String(id.to_hex())));
        assert_eq!(lsp.tags, None);

        let back = lsp_call_hierarchy_item_to_ide(&lsp);
        assert_eq!(back.data, item.data);
        assert_eq!(back.range, item.range);

        let anonymous = resolve::CallHierarchyItem {
            data: String::new(),
            ..item.clone()
        };
        assert_eq!(call_hierarchy_item_to_lsp(&anonymous).and_then(|lsp| lsp.data), None);

        let call = resolve::CallHierarchyIncomingCall {
            from: item,
            from_ranges: vec![range(5, 2, 5)],
        };
        let lsp_call = incoming_call_to_lsp(&call).expect("valid uri");
        assert_eq!(lsp_call.from_ranges, vec![ide_range_to_lsp(range(5, 2, 5))]);
    }
