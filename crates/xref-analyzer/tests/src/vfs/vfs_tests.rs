    use super::*;

    #[test]
    fn absolute_paths_round_trip_through_file_uris() {
        let uri = path_to_uri(Path::new("/xref/dir/main.cpp")).expect("absolute path");
        assert_eq!(uri, "file:///xref/dir/main.cpp");
        assert_eq!(uri_to_path(&uri), Some(PathBuf::from("/xref/dir/main.cpp")));
    }

    #[test]
    fn relative_paths_and_foreign_schemes_have_no_counterpart() {
        assert_eq!(path_to_uri(Path::new("main.cpp")), None);
        assert_eq!(uri_to_path("test:///main.cpp"), None);
        assert_eq!(uri_to_path("not a uri"), None);
        assert_eq!(FileId::from_uri("https://example.com/a.cpp"), None);
    }

    #[test]
    fn missing_files_keep_their_path_as_the_key() {
        let id = FileId::from_path(Path::new("/xref/does-not-exist/main.cpp"));
        assert_eq!(id.path(), Path::new("/xref/does-not-exist/main.cpp"));
        assert_eq!(FileId::from_uri("file:///xref/does-not-exist/main.cpp"), Some(id));
    }

    #[test]
    fn existing_files_are_canonicalized() {
        let dir = std::env::temp_dir();
        let dotted = dir.join(".").join(format!("xref-vfs-{}.cpp", std::process::id()));
        std::fs::write(&dotted, "int x;\n").expect("write temp file");
        let id = FileId::from_path(&dotted);
        assert_eq!(id, FileId::from_path(&dotted.canonicalize().expect("canonical")));
        let _ = std::fs::remove_file(&dotted);
    }
