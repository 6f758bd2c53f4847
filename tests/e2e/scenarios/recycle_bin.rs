use crate::harness::{Assertion, Scenario};
use amber_core::{Library, OperationKind};

const ALL: &str = "全部资料";
const RECYCLE: &str = "回收站";

#[test]
fn test_recycled_anchor_leaves_every_folder() {
    Scenario::new("recycle_exclusive")
        .with_file("a.txt", b"a")
        .create_folder("Work")
        .create_folder("Home")
        .create_anchor("a", "a.txt", "Work")
        .bind_folders("a", &["Home"])
        .recycle("a")
        .assert_recycled("a")
        .assert_in_folder("a", RECYCLE)
        .assert_not_in_folder("a", ALL)
        .assert_not_in_folder("a", "Work")
        .assert_not_in_folder("a", "Home")
        .assert(Assertion::FolderAnchorCount {
            folder: ALL.to_string(),
            count: 0,
        })
        .assert_recycle_bin_count(1)
        .run()
        .unwrap();
}

#[test]
fn test_recycle_twice_is_a_no_op() {
    Scenario::new("recycle_twice")
        .with_file("a.txt", b"a")
        .create_folder("Work")
        .create_anchor("a", "a.txt", "Work")
        .recycle("a")
        .recycle("a")
        .assert_recycled("a")
        .assert_recycle_bin_count(1)
        .assert(Assertion::Custom(Box::new(|library: &mut Library| {
            let recycles = library
                .operation_log(None)?
                .into_iter()
                .filter(|e| e.operation_type_name == OperationKind::RecycleAnchor.name())
                .count();
            anyhow::ensure!(recycles == 1, "logged {} recycles", recycles);
            Ok(())
        })))
        .run()
        .unwrap();
}

#[test]
fn test_restore_into_a_new_folder() {
    Scenario::new("restore_into_new_folder")
        .with_file("a.txt", b"a")
        .create_folder("Work")
        .create_folder("Archive")
        .create_anchor("a", "a.txt", "Work")
        .recycle("a")
        .restore("a", "Archive")
        .assert_active("a")
        .assert_in_folder("a", ALL)
        .assert_in_folder("a", "Archive")
        .assert_not_in_folder("a", "Work")
        .assert_not_in_folder("a", RECYCLE)
        .assert_recycle_bin_count(0)
        .run()
        .unwrap();
}

#[test]
fn test_recycled_anchor_rejects_edits() {
    Scenario::new("recycled_rejects_edits")
        .with_file("a.txt", b"a")
        .create_folder("Work")
        .create_anchor("a", "a.txt", "Work")
        .recycle("a")
        .bind_folders("a", &["Work"])
        .fails_invalid()
        .add_tags("a", &["late"])
        .fails_invalid()
        .restore("a", RECYCLE)
        .fails_invalid()
        .restore("a", "Gone")
        .fails_not_found()
        .assert_recycled("a")
        .run()
        .unwrap();
}

#[test]
fn test_restore_requires_recycled_anchor() {
    Scenario::new("restore_active")
        .with_file("a.txt", b"a")
        .create_folder("Work")
        .create_anchor("a", "a.txt", "Work")
        .restore("a", "Work")
        .fails_invalid()
        .assert_active("a")
        .run()
        .unwrap();
}

#[test]
fn test_empty_bin_keeps_active_anchors() {
    Scenario::new("empty_bin_selective")
        .with_file("keep.txt", b"keep")
        .with_file("drop.txt", b"drop")
        .create_folder("Work")
        .create_anchor("keep", "keep.txt", "Work")
        .create_anchor("drop", "drop.txt", "Work")
        .recycle("drop")
        .empty_recycle_bin()
        .assert_active("keep")
        .assert(Assertion::AnchorPurged {
            anchor: "drop".to_string(),
        })
        .assert(Assertion::FolderAnchorCount {
            folder: "Work".to_string(),
            count: 1,
        })
        .assert_file_content("drop.txt", b"drop")
        .run()
        .unwrap();
}

#[test]
fn test_empty_bin_when_already_empty() {
    Scenario::new("empty_bin_noop")
        .empty_recycle_bin()
        .assert_recycle_bin_count(0)
        .assert_logged(OperationKind::EmptyRecycleBin)
        .run()
        .unwrap();
}
