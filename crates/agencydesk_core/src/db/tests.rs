//! Database integration tests.

use super::*;
use crate::models::booking::Booking;
use crate::models::file::{FileRecord, FileStatus, UpdateFileRequest};
use crate::models::folder::Folder;
use crate::models::quote::{CreateQuoteRequest, Quote, QuoteKind, QuotePatch, QuoteStatus};
use crate::models::task::{CreateTaskRequest, Task, TaskPatch, TaskStatus};
use chrono::{Duration, NaiveDate, NaiveTime, Utc};
use tempfile::TempDir;

fn setup_test_db() -> (Database, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("db");
    let db = Database::new(db_path.to_str().unwrap()).unwrap();
    (db, temp_dir)
}

fn folder(db: &Database, owner: &str, name: &str) -> Folder {
    let folder = Folder::new(owner, name.to_string());
    db.folders.create(&folder).expect("create folder");
    folder
}

fn file_in(owner: &str, folder_id: &str, name: &str) -> FileRecord {
    let mut file = FileRecord::draft(folder_id, name, 1024);
    file.id = uuid::Uuid::new_v4().to_string();
    file.owner_id = owner.to_string();
    file.storage_path = format!("{}/{}/{}", owner, folder_id, name);
    file.status = FileStatus::Ready;
    file
}

fn count(db: &Database, folder_id: &str) -> usize {
    db.folders
        .get(folder_id)
        .expect("get")
        .expect("folder exists")
        .item_count
}

#[test]
fn folders_are_scoped_by_owner_and_sorted_by_name() {
    let (db, _dir) = setup_test_db();
    folder(&db, "alice", "contracts");
    folder(&db, "alice", "Brand assets");
    folder(&db, "bob", "private");

    let names: Vec<String> = db
        .folders
        .list_for_owner("alice")
        .unwrap()
        .into_iter()
        .map(|f| f.name)
        .collect();
    assert_eq!(names, vec!["Brand assets", "contracts"]);
}

#[test]
fn folder_rename_returns_none_for_missing_ids() {
    let (db, _dir) = setup_test_db();
    let f = folder(&db, "alice", "old");
    let renamed = db.folders.rename(&f.id, "new").unwrap().unwrap();
    assert_eq!(renamed.name, "new");
    assert!(renamed.updated_at >= f.updated_at);
    assert!(db.folders.rename("missing", "x").unwrap().is_none());
}

#[test]
fn file_create_and_delete_maintain_folder_count() {
    let (db, _dir) = setup_test_db();
    let f = folder(&db, "alice", "docs");
    let a = file_in("alice", &f.id, "a.pdf");
    let b = file_in("alice", &f.id, "b.pdf");
    TransactionOps::create_file_with_folder(&db, &a).unwrap();
    TransactionOps::create_file_with_folder(&db, &b).unwrap();
    assert_eq!(count(&db, &f.id), 2);

    let removed = TransactionOps::delete_file_with_folder(&db, &a.id).unwrap();
    assert_eq!(removed.map(|r| r.id), Some(a.id.clone()));
    assert_eq!(count(&db, &f.id), 1);
    assert!(TransactionOps::delete_file_with_folder(&db, &a.id)
        .unwrap()
        .is_none());
    assert_eq!(count(&db, &f.id), 1);
}

#[test]
fn file_create_rejects_missing_folder_without_writing() {
    let (db, _dir) = setup_test_db();
    let orphan = file_in("alice", "no-such-folder", "a.pdf");
    let result = TransactionOps::create_file_with_folder(&db, &orphan);
    assert!(matches!(result, Err(AppError::NotFound)));
    assert!(db.files.get(&orphan.id).unwrap().is_none());
}

#[test]
fn moving_a_file_shifts_one_count_between_folders() {
    let (db, _dir) = setup_test_db();
    let from = folder(&db, "alice", "from");
    let to = folder(&db, "alice", "to");
    let file = file_in("alice", &from.id, "plan.docx");
    TransactionOps::create_file_with_folder(&db, &file).unwrap();

    let moved = TransactionOps::update_file_with_folders(
        &db,
        &file.id,
        &UpdateFileRequest {
            name: Some("plan-v2.docx".to_string()),
            folder_id: Some(to.id.clone()),
        },
    )
    .unwrap()
    .unwrap();
    assert_eq!(moved.folder_id, to.id);
    assert_eq!(moved.name, "plan-v2.docx");
    assert_eq!(count(&db, &from.id), 0);
    assert_eq!(count(&db, &to.id), 1);
    assert_eq!(db.files.list_for_folder("alice", &to.id).unwrap().len(), 1);
}

#[test]
fn moving_to_a_missing_folder_leaves_rows_untouched() {
    let (db, _dir) = setup_test_db();
    let from = folder(&db, "alice", "from");
    let file = file_in("alice", &from.id, "plan.docx");
    TransactionOps::create_file_with_folder(&db, &file).unwrap();

    let result = TransactionOps::update_file_with_folders(
        &db,
        &file.id,
        &UpdateFileRequest {
            name: None,
            folder_id: Some("gone".to_string()),
        },
    );
    assert!(matches!(result, Err(AppError::NotFound)));
    assert_eq!(db.files.get(&file.id).unwrap().unwrap().folder_id, from.id);
    assert_eq!(count(&db, &from.id), 1);
}

#[test]
fn deleting_a_folder_removes_its_files() {
    let (db, _dir) = setup_test_db();
    let doomed = folder(&db, "alice", "doomed");
    let kept = folder(&db, "alice", "kept");
    let a = file_in("alice", &doomed.id, "a.txt");
    let b = file_in("alice", &kept.id, "b.txt");
    TransactionOps::create_file_with_folder(&db, &a).unwrap();
    TransactionOps::create_file_with_folder(&db, &b).unwrap();

    let removed = TransactionOps::delete_folder_with_files(&db, &doomed.id)
        .unwrap()
        .unwrap();
    assert_eq!(removed.len(), 1);
    assert_eq!(removed[0].id, a.id);
    assert!(db.folders.get(&doomed.id).unwrap().is_none());
    assert!(db.files.get(&a.id).unwrap().is_none());
    assert!(db.files.get(&b.id).unwrap().is_some());
    assert!(TransactionOps::delete_folder_with_files(&db, &doomed.id)
        .unwrap()
        .is_none());
}

#[test]
fn reopen_repairs_folder_count_drift() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("db");
    let path = path.to_str().unwrap();

    let folder_id = {
        let db = Database::new(path).unwrap();
        let f = folder(&db, "alice", "drift");
        TransactionOps::create_file_with_folder(&db, &file_in("alice", &f.id, "a")).unwrap();
        TransactionOps::create_file_with_folder(&db, &file_in("alice", &f.id, "b")).unwrap();
        db.folders.set_count(&f.id, 99).unwrap();
        f.id
    };

    let reopened = Database::new(path).unwrap();
    assert_eq!(count(&reopened, &folder_id), 2);
    assert_eq!(
        reopened.files.count_by_folder().unwrap().get(&folder_id),
        Some(&2)
    );
}

#[test]
fn database_new_rejects_a_plain_file_path() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("not-a-dir");
    std::fs::write(&path, b"x").unwrap();
    let result = Database::new(path.to_str().unwrap());
    assert!(matches!(result, Err(AppError::StorageMessage(_))));
}

#[test]
fn database_new_creates_redb_file() {
    let (_db, dir) = setup_test_db();
    assert!(dir.path().join("db").join(tables::REDB_FILE_NAME).exists());
}

#[test]
fn tasks_list_newest_first_and_update_in_place() {
    let (db, _dir) = setup_test_db();
    let now = Utc::now();
    let older = Task::from_request(
        "alice",
        &CreateTaskRequest {
            title: "older".to_string(),
            ..CreateTaskRequest::default()
        },
        now - Duration::minutes(5),
    );
    let newer = Task::from_request(
        "alice",
        &CreateTaskRequest {
            title: "newer".to_string(),
            ..CreateTaskRequest::default()
        },
        now,
    );
    db.tasks.create(&older).unwrap();
    db.tasks.create(&newer).unwrap();

    let titles: Vec<String> = db
        .tasks
        .list_for_owner("alice")
        .unwrap()
        .into_iter()
        .map(|t| t.title)
        .collect();
    assert_eq!(titles, vec!["newer", "older"]);
    assert!(db.tasks.list_for_owner("bob").unwrap().is_empty());

    let done = db
        .tasks
        .update(&older.id, &TaskPatch::status(TaskStatus::Done), now)
        .unwrap()
        .unwrap();
    assert_eq!(done.status, TaskStatus::Done);
    assert_eq!(db.tasks.get(&older.id).unwrap().unwrap().completed_at, Some(now));

    assert!(db.tasks.delete(&older.id).unwrap());
    assert!(!db.tasks.delete(&older.id).unwrap());
    assert!(db
        .tasks
        .update(&older.id, &TaskPatch::default(), now)
        .unwrap()
        .is_none());
}

fn quote_request(kind: QuoteKind) -> CreateQuoteRequest {
    CreateQuoteRequest {
        kind: Some(kind),
        client_name: "Acme".to_string(),
        client_email: "ops@acme.test".to_string(),
        line_items: Vec::new(),
        tax_rate_bps: None,
        issue_date: None,
        due_date: None,
        notes: None,
    }
}

#[test]
fn quote_numbers_are_sequential_per_owner_and_kind() {
    let (db, _dir) = setup_test_db();
    let now = Utc::now();
    let q1 = db
        .quotes
        .create(&Quote::from_request("alice", &quote_request(QuoteKind::Quote), now))
        .unwrap();
    let q2 = db
        .quotes
        .create(&Quote::from_request("alice", &quote_request(QuoteKind::Quote), now))
        .unwrap();
    let inv = db
        .quotes
        .create(&Quote::from_request("alice", &quote_request(QuoteKind::Invoice), now))
        .unwrap();
    let other = db
        .quotes
        .create(&Quote::from_request("bob", &quote_request(QuoteKind::Quote), now))
        .unwrap();

    assert_eq!(q1.number, "Q-0001");
    assert_eq!(q2.number, "Q-0002");
    assert_eq!(inv.number, "INV-0001");
    assert_eq!(other.number, "Q-0001");

    assert!(db.quotes.delete(&q2.id).unwrap());
    let q3 = db
        .quotes
        .create(&Quote::from_request("alice", &quote_request(QuoteKind::Quote), now))
        .unwrap();
    assert_eq!(q3.number, "Q-0003");

    let sent = db
        .quotes
        .update(&q1.id, &QuotePatch::status(QuoteStatus::Sent), now)
        .unwrap()
        .unwrap();
    assert_eq!(sent.status, QuoteStatus::Sent);
    assert_eq!(db.quotes.list_for_owner("alice").unwrap().len(), 3);
}

#[test]
fn bookings_are_listed_per_day_in_time_order() {
    let (db, _dir) = setup_test_db();
    let day = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
    for (hour, name) in [(14, "late"), (9, "early")] {
        db.bookings
            .create(&Booking {
                id: uuid::Uuid::new_v4().to_string(),
                name: name.to_string(),
                email: format!("{}@example.test", name),
                company: None,
                date: day,
                time: NaiveTime::from_hms_opt(hour, 0, 0).unwrap(),
                duration_minutes: 30,
                promo_code: None,
                discount_percent: 0,
                notes: None,
                created_at: Utc::now(),
            })
            .unwrap();
    }
    let names: Vec<String> = db
        .bookings
        .list_for_date(day)
        .unwrap()
        .into_iter()
        .map(|b| b.name)
        .collect();
    assert_eq!(names, vec!["early", "late"]);
    assert!(db
        .bookings
        .list_for_date(day + Duration::days(1))
        .unwrap()
        .is_empty());
}
