use crate::harness::{Assertion, Scenario};
use amber_core::{Library, OperationKind};

#[test]
fn test_backup_then_restore_lost_file() {
    Scenario::new("backup_restore_round_trip")
        .with_file("thesis.docx", b"final version")
        .create_folder("Thesis")
        .create_anchor("thesis", "thesis.docx", "Thesis")
        .configure_backup_dir()
        .backup("thesis", "b1")
        .assert(Assertion::BackupFileExists {
            label: "b1".to_string(),
        })
        .user_deletes_file("thesis.docx")
        .check_all()
        .assert_valid("thesis", false)
        .restore_backup("b1")
        .assert_file_content("thesis.docx", b"final version")
        .assert_valid("thesis", true)
        .assert_logged(OperationKind::RestoreBackup)
        .run()
        .expect("scenario should pass");
}

#[test]
fn test_backup_without_backup_root() {
    Scenario::new("backup_unconfigured")
        .with_file("a.txt", b"a")
        .create_folder("Work")
        .create_anchor("a", "a.txt", "Work")
        .backup("a", "b1")
        .fails_invalid()
        .assert_backup_count("a", 0)
        .run()
        .unwrap();
}

#[test]
fn test_backup_of_missing_source() {
    Scenario::new("backup_missing_source")
        .with_file("a.txt", b"a")
        .create_folder("Work")
        .create_anchor("a", "a.txt", "Work")
        .configure_backup_dir()
        .user_deletes_file("a.txt")
        .backup("a", "b1")
        .fails_not_found()
        .assert_backup_count("a", 0)
        .run()
        .unwrap();
}

#[test]
fn test_restore_refuses_to_overwrite() {
    Scenario::new("restore_conflict")
        .with_file("a.txt", b"v1")
        .create_folder("Work")
        .create_anchor("a", "a.txt", "Work")
        .configure_backup_dir()
        .backup("a", "b1")
        .user_writes("a.txt", b"v2")
        .restore_backup("b1")
        .fails_conflict()
        .assert_file_content("a.txt", b"v2")
        .run()
        .unwrap();
}

#[test]
fn test_several_backups_in_the_same_second() {
    Scenario::new("same_second_backups")
        .with_file("a.txt", b"a")
        .create_folder("Work")
        .create_anchor("a", "a.txt", "Work")
        .configure_backup_dir()
        .backup("a", "b1")
        .backup("a", "b2")
        .wait_hours(1)
        .backup("a", "b3")
        .assert_backup_count("a", 3)
        .assert(Assertion::BackupFileExists {
            label: "b1".to_string(),
        })
        .assert(Assertion::BackupFileExists {
            label: "b2".to_string(),
        })
        .run()
        .unwrap();
}

#[test]
fn test_delete_backup_removes_record_and_file() {
    Scenario::new("delete_backup")
        .with_file("a.txt", b"a")
        .create_folder("Work")
        .create_anchor("a", "a.txt", "Work")
        .configure_backup_dir()
        .backup("a", "b1")
        .delete_backup("b1")
        .assert_backup_count("a", 0)
        .assert(Assertion::Custom(Box::new(|library: &mut Library| {
            anyhow::ensure!(library.backups()?.is_empty(), "backup still listed");
            Ok(())
        })))
        .delete_backup("b1")
        .fails_not_found()
        .restore_backup("b1")
        .fails_not_found()
        .run()
        .unwrap();
}

#[test]
fn test_restore_with_missing_backup_file() {
    Scenario::new("restore_missing_backup_file")
        .with_file("a.txt", b"a")
        .create_folder("Work")
        .create_anchor("a", "a.txt", "Work")
        .configure_backup_dir()
        .backup("a", "b1")
        .assert(Assertion::Custom(Box::new(|library: &mut Library| {
            for backup in library.backups()? {
                std::fs::remove_file(&backup.backup_path)?;
            }
            Ok(())
        })))
        .user_deletes_file("a.txt")
        .restore_backup("b1")
        .fails_not_found()
        .assert(Assertion::FileMissing {
            path: "a.txt".to_string(),
        })
        .run()
        .unwrap();
}
