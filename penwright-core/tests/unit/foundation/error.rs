use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        PenwrightError::library_not_found("ada")
            .to_string()
            .contains("library not found:")
    );
    assert!(
        PenwrightError::content_rejected("x")
            .to_string()
            .contains("content rejected:")
    );
    assert!(
        PenwrightError::missing_glyph('q')
            .to_string()
            .contains("missing glyph:")
    );
    assert!(
        PenwrightError::out_of_bounds("x")
            .to_string()
            .contains("out of bounds:")
    );
    assert!(
        PenwrightError::invalid_config("x")
            .to_string()
            .contains("invalid configuration:")
    );
    assert!(
        PenwrightError::pen_state("x")
            .to_string()
            .contains("pen state violation:")
    );
    assert!(
        PenwrightError::encoding("x")
            .to_string()
            .contains("encoding error:")
    );
    assert!(
        PenwrightError::serde("x")
            .to_string()
            .contains("serialization error:")
    );
}

#[test]
fn library_not_found_names_the_user() {
    let err = PenwrightError::library_not_found("ada");
    assert!(err.to_string().contains("'ada'"));
    assert!(matches!(err, PenwrightError::LibraryNotFound { ref user } if user == "ada"));
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = PenwrightError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}
