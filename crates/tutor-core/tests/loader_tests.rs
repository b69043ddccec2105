use std::fs;
use tempfile::TempDir;

use tutor_core::error::Error;
use tutor_core::loader::load_pages;

#[test]
fn missing_directory_is_a_setup_error() {
    let tmp = TempDir::new().unwrap();
    let missing = tmp.path().join("nope");
    match load_pages(&missing) {
        Err(Error::Setup(msg)) => assert!(msg.contains("does not exist")),
        other => panic!("expected setup error, got {:?}", other.map(|p| p.len())),
    }
}

#[test]
fn directory_without_documents_is_a_setup_error() {
    let tmp = TempDir::new().unwrap();
    match load_pages(tmp.path()) {
        Err(Error::Setup(msg)) => assert!(msg.contains("no source documents")),
        other => panic!("expected setup error, got {:?}", other.map(|p| p.len())),
    }
}

#[test]
fn form_feeds_separate_pages() {
    let tmp = TempDir::new().unwrap();
    fs::write(
        tmp.path().join("science.txt"),
        "Photosynthesis converts light into chemical energy.\u{c}Respiration releases energy from glucose.",
    )
    .unwrap();

    let pages = load_pages(tmp.path()).expect("load");
    assert_eq!(pages.len(), 2);
    assert_eq!(pages[0].page, Some(1));
    assert_eq!(pages[1].page, Some(2));
    assert_eq!(pages[0].source, "science.txt");
    assert!(pages[1].text.contains("Respiration"));
}

#[test]
fn a_plain_file_is_a_single_page_one_document() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("notes.txt"), "Short text").unwrap();

    let pages = load_pages(tmp.path()).expect("load");
    assert_eq!(pages.len(), 1);
    assert_eq!(pages[0].page, Some(1));
}
