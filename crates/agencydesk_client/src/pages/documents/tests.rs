use super::*;
use crate::optimistic::ItemState;
use crate::test_support::{session_for, setup_services};
use agencydesk_core::models::file::FileStatus;
use std::time::Duration;

const WAIT: Duration = Duration::from_secs(2);

fn settle(page: &mut DocumentsPage, events: usize) {
    for n in 0..events {
        assert!(page.wait_for_event(WAIT), "missing backend event #{}", n + 1);
    }
}

/// Page for alice with folders `F1` and `F2` loaded and `F1` open.
fn page_with_folders(quota: Option<u64>) -> (DocumentsPage, String, String, tempfile::TempDir) {
    let (services, guard) = setup_services(quota);
    let f1 = Folder::new("alice", "F1".to_string());
    let f2 = Folder::new("alice", "F2".to_string());
    services.db.folders.create(&f1).expect("f1");
    services.db.folders.create(&f2).expect("f2");

    let mut page = DocumentsPage::new(services, session_for("alice"));
    page.refresh();
    page.open_folder(&f1.id);
    settle(&mut page, 2);
    assert_eq!(page.folders().len(), 2);
    (page, f1.id, f2.id, guard)
}

fn upload_confirmed(page: &mut DocumentsPage, folder_id: &str, name: &str, size: usize) -> String {
    let pending = page.upload(folder_id, name, vec![7u8; size]);
    // FileUploaded, then the folder refetch.
    settle(page, 2);
    assert_eq!(page.files().get(&RecordKey::Pending(pending)), None);
    page.files()
        .records()
        .find(|f| f.name == name)
        .map(|f| f.id.clone())
        .expect("uploaded file listed")
}

#[test]
fn folder_create_is_pending_until_confirmed() {
    let (services, _guard) = setup_services(None);
    let mut page = DocumentsPage::new(services, session_for("alice"));

    let pending = page.create_folder("Invoices");
    assert_eq!(
        page.folders().state_of(&RecordKey::Pending(pending)),
        Some(ItemState::Pending)
    );
    assert_eq!(
        page.rename_folder("anything", "x").err(),
        Some(SyncError::NotFound)
    );

    settle(&mut page, 1);
    assert_eq!(page.folders().pending_count(), 0);
    let folder = page.folders().records().next().expect("folder");
    assert_eq!(folder.name, "Invoices");
    assert!(!folder.id.is_empty());
}

#[test]
fn rejected_folder_create_shows_reason() {
    let (services, _guard) = setup_services(None);
    let mut page = DocumentsPage::new(services, session_for("alice"));
    page.create_folder("   ");
    settle(&mut page, 1);
    assert!(page.folders().is_empty());
    assert_eq!(
        page.feedback().status(),
        Some("folder name must not be empty")
    );
}

#[test]
fn rejected_rename_restores_folder_name() {
    let (mut page, f1, _f2, _guard) = page_with_folders(None);
    page.rename_folder(&f1, "").expect("rename applied");
    assert_eq!(
        page.folders()
            .get(&RecordKey::Confirmed(f1.clone()))
            .expect("f1")
            .name,
        ""
    );

    settle(&mut page, 1);
    assert_eq!(
        page.folders()
            .get(&RecordKey::Confirmed(f1))
            .expect("f1")
            .name,
        "F1"
    );
    assert_eq!(
        page.feedback().status(),
        Some("folder name must not be empty")
    );
}

#[test]
fn upload_into_closed_folder_only_bumps_count() {
    let (mut page, _f1, f2, _guard) = page_with_folders(None);
    page.upload(&f2, "brief.txt", b"hello".to_vec());
    assert_eq!(page.files().len(), 0);
    assert_eq!(page.item_count(&f2), 1);

    settle(&mut page, 2);
    assert_eq!(page.files().len(), 0);
    assert_eq!(page.item_count(&f2), 1);
}

#[test]
fn move_reconciles_both_counts() {
    let (mut page, f1, f2, _guard) = page_with_folders(None);
    let file_id = upload_confirmed(&mut page, &f1, "logo.png", 128);
    assert_eq!(page.item_count(&f1), 1);

    page.move_file(&file_id, &f2).expect("move applied");
    // FileUpdated, folder refetch, file refetch of the open folder.
    settle(&mut page, 3);

    assert_eq!(page.item_count(&f1), 0);
    assert_eq!(page.item_count(&f2), 1);
    assert!(page.files().is_empty());
}

#[test]
fn move_to_missing_folder_rolls_back() {
    let (mut page, f1, _f2, _guard) = page_with_folders(None);
    let file_id = upload_confirmed(&mut page, &f1, "logo.png", 128);

    page.move_file(&file_id, "no-such-folder").expect("move applied");
    settle(&mut page, 1);

    let file = page
        .files()
        .get(&RecordKey::Confirmed(file_id))
        .expect("file");
    assert_eq!(file.folder_id, f1);
    assert!(page.feedback().status().is_some());
    assert_eq!(page.item_count(&f1), 1);
}

#[test]
fn delete_needs_confirmation() {
    let (mut page, f1, _f2, _guard) = page_with_folders(None);
    let file_id = upload_confirmed(&mut page, &f1, "draft.docx", 64);

    page.request_delete(DeleteTarget::File(file_id.clone()));
    page.cancel_delete();
    assert_eq!(page.confirm_delete(), Err(SyncError::NotFound));
    assert_eq!(page.files().len(), 1);

    page.request_delete(DeleteTarget::File(file_id.clone()));
    assert_eq!(
        page.staged_delete(),
        Some(&DeleteTarget::File(file_id.clone()))
    );
    page.confirm_delete().expect("delete applied");
    assert!(page.files().is_empty());
    assert_eq!(page.item_count(&f1), 0);

    settle(&mut page, 2);
    assert!(page.files().is_empty());
    assert_eq!(page.item_count(&f1), 0);
}

#[test]
fn deleting_folder_closes_it() {
    let (mut page, f1, _f2, _guard) = page_with_folders(None);
    upload_confirmed(&mut page, &f1, "a.txt", 4);

    page.request_delete(DeleteTarget::Folder(f1.clone()));
    page.confirm_delete().expect("delete applied");
    assert_eq!(page.folders().len(), 1);

    settle(&mut page, 2);
    assert_eq!(page.open_folder_id(), None);
    assert_eq!(page.folders().len(), 1);
    assert_eq!(page.item_count(&f1), 0);
}

#[test]
fn placeholder_shows_uploading_status() {
    let (mut page, f1, _f2, _guard) = page_with_folders(None);
    let pending = page.upload(&f1, "notes.md", b"# hi".to_vec());
    let placeholder = page
        .files()
        .get(&RecordKey::Pending(pending))
        .expect("placeholder");
    assert_eq!(placeholder.status, FileStatus::Uploading);
    assert_eq!(
        page.files().state_of(&RecordKey::Pending(pending)),
        Some(ItemState::Pending)
    );
    settle(&mut page, 2);
    let file = page.files().records().next().expect("file");
    assert_eq!(file.status, FileStatus::Ready);
}

#[test]
fn refetch_during_failed_upload_keeps_server_count() {
    let (mut page, f1, _f2, _guard) = page_with_folders(Some(3000));
    upload_confirmed(&mut page, &f1, "small.txt", 100);
    assert_eq!(page.item_count(&f1), 1);

    // The refetch runs before the upload and lands first.
    page.refresh();
    page.upload(&f1, "huge.bin", vec![0u8; 5000]);
    assert_eq!(page.item_count(&f1), 2);

    settle(&mut page, 1);
    assert_eq!(page.item_count(&f1), 2);

    settle(&mut page, 1);
    assert_eq!(page.feedback().status(), Some("quota exceeded"));
    assert_eq!(page.item_count(&f1), 1);
    assert_eq!(page.files().len(), 1);
}

#[test]
fn refetch_during_delete_keeps_it_subtracted() {
    let (mut page, f1, _f2, _guard) = page_with_folders(None);
    let file_id = upload_confirmed(&mut page, &f1, "draft.docx", 64);

    page.refresh();
    page.request_delete(DeleteTarget::File(file_id));
    page.confirm_delete().expect("delete applied");
    assert_eq!(page.item_count(&f1), 0);

    // Folder refetch from before the delete still reports the file.
    settle(&mut page, 1);
    assert_eq!(page.item_count(&f1), 0);

    // FileDeleted, then the refetch it triggers.
    settle(&mut page, 2);
    assert_eq!(page.item_count(&f1), 0);
    assert!(page.files().is_empty());
}

#[test]
fn switching_folders_during_move_still_settles_counts() {
    let (mut page, f1, f2, _guard) = page_with_folders(None);
    let file_id = upload_confirmed(&mut page, &f1, "logo.png", 128);

    page.move_file(&file_id, &f2).expect("move applied");
    page.open_folder(&f2);
    assert_eq!(page.item_count(&f1), 0);
    assert_eq!(page.item_count(&f2), 1);

    // FileUpdated, files of F2, then the folder and file refetches.
    settle(&mut page, 4);

    assert_eq!(page.open_folder_id(), Some(f2.as_str()));
    assert_eq!(page.item_count(&f1), 0);
    assert_eq!(page.item_count(&f2), 1);
    let moved = page
        .files()
        .get(&RecordKey::Confirmed(file_id))
        .expect("moved file listed");
    assert_eq!(moved.folder_id, f2);
}

#[test]
fn upload_into_closed_folder_adds_no_placeholder() {
    let (mut page, _f1, f2, _guard) = page_with_folders(None);
    let pending = page.upload(&f2, "brief.txt", b"hello".to_vec());
    assert_eq!(page.files().get(&RecordKey::Pending(pending)), None);
    assert_eq!(page.files().pending_count(), 0);

    let next = page.upload(&f2, "brief-2.txt", b"again".to_vec());
    assert_ne!(next, pending);
    assert_eq!(page.item_count(&f2), 2);
}
