use crate::harness::{Assertion, Scenario};
use amber_core::{Library, OperationKind, SystemFolder};

const ALL: &str = "全部资料";
const RECYCLE: &str = "回收站";

#[test]
fn test_system_folder_names_match_bootstrap() {
    assert_eq!(SystemFolder::All.name(), ALL);
    assert_eq!(SystemFolder::Recycle.name(), RECYCLE);
}

#[test]
fn test_full_anchor_lifecycle() {
    Scenario::new("full_anchor_lifecycle")
        .with_file("thesis/draft.docx", b"chapter one")
        .create_folder("Thesis")
        .create_anchor("draft", "thesis/draft.docx", "Thesis")
        .assert_active("draft")
        .assert_in_folder("draft", ALL)
        .assert_in_folder("draft", "Thesis")
        .add_tags("draft", &["writing", "2024"])
        .assert_use_count("writing", 1)
        .configure_backup_dir()
        .backup("draft", "first")
        .assert_backup_count("draft", 1)
        .recycle("draft")
        .assert_recycled("draft")
        .assert_not_in_folder("draft", "Thesis")
        .assert_use_count("writing", 0)
        .restore("draft", "Thesis")
        .assert_active("draft")
        .assert_backup_count("draft", 1)
        .recycle("draft")
        .empty_recycle_bin()
        .assert(Assertion::AnchorPurged {
            anchor: "draft".to_string(),
        })
        .assert(Assertion::BackupFileExists {
            label: "first".to_string(),
        })
        .assert_recycle_bin_count(0)
        .assert_logged(OperationKind::EmptyRecycleBin)
        .run()
        .expect("scenario should pass");
}

#[test]
fn test_anchor_bound_to_several_folders() {
    Scenario::new("several_folders")
        .with_file("notes.md", b"# notes")
        .create_folder("Work")
        .create_folder("Reading")
        .create_anchor("notes", "notes.md", "Work")
        .bind_folders("notes", &["Reading"])
        .assert_in_folder("notes", ALL)
        .assert_in_folder("notes", "Reading")
        .assert_in_folder("notes", "Work")
        .bind_folders("notes", &["Work", "Reading", "Work"])
        .assert(Assertion::FolderAnchorCount {
            folder: "Work".to_string(),
            count: 1,
        })
        .assert(Assertion::FolderAnchorCount {
            folder: ALL.to_string(),
            count: 1,
        })
        .run()
        .unwrap();
}

#[test]
fn test_folder_rename_and_delete() {
    Scenario::new("folder_rename_and_delete")
        .with_file("a.txt", b"a")
        .create_folder("Draft")
        .create_anchor("a", "a.txt", "Draft")
        .rename_folder("Draft", "Final")
        .assert_in_folder("a", "Final")
        .delete_folder("Final")
        .assert_active("a")
        .assert_in_folder("a", ALL)
        .assert_logged(OperationKind::DeleteFolder)
        .run()
        .unwrap();
}

#[test]
fn test_folder_errors() {
    Scenario::new("folder_errors")
        .create_folder("Work")
        .create_folder("Work")
        .fails_conflict()
        .create_folder(ALL)
        .fails_conflict()
        .delete_folder(RECYCLE)
        .fails_invalid()
        .delete_folder("Nope")
        .fails_not_found()
        .create_folder("   ")
        .fails_invalid()
        .run()
        .unwrap();
}

#[test]
fn test_anchor_cannot_be_created_in_system_folder() {
    Scenario::new("anchor_in_system_folder")
        .with_file("a.txt", b"a")
        .create_anchor("a", "a.txt", RECYCLE)
        .fails_invalid()
        .create_anchor("b", "a.txt", "Missing")
        .fails_not_found()
        .run()
        .unwrap();
}

#[test]
fn test_validity_follows_the_file() {
    Scenario::new("validity_follows_file")
        .with_file("report.pdf", b"%PDF")
        .create_folder("Docs")
        .create_anchor("report", "report.pdf", "Docs")
        .assert_valid("report", true)
        .user_deletes_file("report.pdf")
        .assert_valid("report", true)
        .check_all()
        .assert_valid("report", false)
        .user_writes("report.pdf", b"%PDF again")
        .check_all()
        .assert_valid("report", true)
        .run()
        .unwrap();
}

#[test]
fn test_operations_are_logged_in_order() {
    Scenario::new("operations_logged")
        .with_file("a.txt", b"a")
        .create_folder("Work")
        .wait_hours(1)
        .create_anchor("a", "a.txt", "Work")
        .assert(Assertion::OperationLogLen(2))
        .assert(Assertion::Custom(Box::new(|library: &mut Library| {
            let log = library.operation_log(Some(1))?;
            anyhow::ensure!(log.len() == 1, "limit not applied");
            anyhow::ensure!(
                log[0].operation_type_name == OperationKind::CreateAnchor.name(),
                "newest entry is {}",
                log[0].operation_type_name
            );
            Ok(())
        })))
        .run()
        .unwrap();
}
