//! Tests for identifier extraction from URLs and free text.

use classroom_dl::url_parser::extract_id;

mod file_segments {
    use super::*;

    #[test]
    fn drive_file_url() {
        let url = "https://drive.google.com/file/d/ABC123-_xyz/view";
        assert_eq!(extract_id(url).unwrap(), "ABC123-_xyz");
    }

    #[test]
    fn docs_editor_url() {
        let url = "https://docs.google.com/document/d/1abc123XYZ/edit?usp=sharing";
        assert_eq!(extract_id(url).unwrap(), "1abc123XYZ");
    }

    #[test]
    fn embedded_in_description_text() {
        let text = "Homework is here https://drive.google.com/file/d/1hw2hw3hw/view thanks";
        assert_eq!(extract_id(text).unwrap(), "1hw2hw3hw");
    }
}

mod folder_segments {
    use super::*;

    #[test]
    fn folder_url() {
        let url = "https://drive.google.com/drive/folders/FOLDER1";
        assert_eq!(extract_id(url).unwrap(), "FOLDER1");
    }

    #[test]
    fn folder_url_with_user_and_query() {
        let url = "https://drive.google.com/drive/u/0/folders/1abc123XYZ?usp=sharing";
        assert_eq!(extract_id(url).unwrap(), "1abc123XYZ");
    }
}

mod bare_tokens {
    use super::*;

    #[test]
    fn long_token_returned_verbatim() {
        let id = "1a2b3c4d5e6f7g8h9i0j1a2b3c4d5";
        assert_eq!(extract_id(id).unwrap(), id);
    }

    #[test]
    fn token_with_hyphen_and_underscore() {
        let id = "1a2b3c-d5e6f_g8h9i0j1a2b3";
        assert_eq!(extract_id(id).unwrap(), id);
    }

    #[test]
    fn whitespace_trimmed() {
        let id = "1a2b3c4d5e6f7g8h9i0j1a2b3";
        assert_eq!(extract_id(&format!("  {id}\n")).unwrap(), id);
    }

    #[test]
    fn short_token_is_no_match() {
        assert_eq!(extract_id("short"), None);
        assert_eq!(extract_id("abcdefghij1234567890abcd"), None); // 24 chars
    }
}

mod priority {
    use super::*;

    #[test]
    fn file_segment_beats_folder_segment() {
        let url = "https://x.test/d/FILEID/folders/FOLDERID";
        assert_eq!(extract_id(url).unwrap(), "FILEID");
    }
}

mod no_match {
    use super::*;

    #[test]
    fn empty_and_whitespace() {
        assert_eq!(extract_id(""), None);
        assert_eq!(extract_id("   "), None);
        assert_eq!(extract_id("\t\n"), None);
    }

    #[test]
    fn unrelated_text() {
        assert_eq!(extract_id("Please read chapter 4 before class"), None);
        assert_eq!(extract_id("https://example.com/folder/123"), None);
    }
}
