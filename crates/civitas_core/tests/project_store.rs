use chrono::NaiveDate;
use civitas_core::{
    decode_snapshot, ClaimKey, ClaimStatus, DocumentCategory, DocumentKey, Element,
    MemorySnapshotStore, NewClaim, NewDocument, NewProject, NewTask, NotFound, ProjectId,
    ProjectStore, StoreConfig, StoreError, TaskKey, TaskPriority, TaskStatus, ValidationError,
    ValueBasis, DEFAULT_CLAIM_NOTES,
};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn new_store() -> ProjectStore<MemorySnapshotStore> {
    ProjectStore::open(StoreConfig::default(), MemorySnapshotStore::new()).unwrap()
}

fn new_project(id: &str) -> NewProject {
    NewProject {
        id: id.to_string(),
        name: "Riverside clinic".to_string(),
        client: "Health Dept".to_string(),
        description: "Two-storey outpatient block".to_string(),
        start_date: date(2024, 1, 1),
        end_date: date(2024, 12, 31),
        budget: 100_000.0,
    }
}

fn new_task(name: &str) -> NewTask {
    NewTask {
        name: name.to_string(),
        assigned_to: "Site crew A".to_string(),
        priority: TaskPriority::High,
        deadline: date(2024, 3, 15),
        description: "Per drawing S-101".to_string(),
    }
}

fn new_claim(amount: f64) -> NewClaim {
    NewClaim {
        amount,
        status: ClaimStatus::Pending,
        payment_schedule: date(2024, 4, 30),
        notes: None,
    }
}

fn pid(value: &str) -> ProjectId {
    ProjectId::parse(value).unwrap()
}

#[test]
fn create_project_initializes_every_configured_element() {
    let mut store = new_store();
    let id = store.create_project(&new_project("P1")).unwrap();

    let project = store.project(&id).unwrap();
    assert_eq!(project.elements().collect::<Vec<_>>(), Element::ALL.to_vec());
    assert!(project.progress_by_element.values().all(|entry| !entry.is_set()));
    assert!(project.tasks.is_empty());
    assert!(project.documents.is_empty());
    assert!(project.interim_claims.is_empty());
    assert_eq!(store.backend().save_count(), 1);
}

#[test]
fn create_project_validates_required_fields_and_dates() {
    let mut store = new_store();

    for (field, mut input) in [
        ("id", new_project("   ")),
        ("name", new_project("P1")),
        ("client", new_project("P1")),
    ] {
        match field {
            "name" => input.name = String::new(),
            "client" => input.client = " ".to_string(),
            _ => {}
        }
        let err = store.create_project(&input).unwrap_err();
        assert!(
            matches!(err, StoreError::Validation(ValidationError::EmptyField(f)) if f == field),
            "unexpected error for {field}: {err}"
        );
    }

    let mut reversed = new_project("P1");
    reversed.end_date = date(2023, 6, 1);
    assert!(matches!(
        store.create_project(&reversed).unwrap_err(),
        StoreError::Validation(ValidationError::EndBeforeStart { .. })
    ));

    assert!(store.projects().is_empty());
    assert_eq!(store.backend().save_count(), 0);
}

#[test]
fn create_project_rejects_duplicate_id() {
    let mut store = new_store();
    store.create_project(&new_project("P1")).unwrap();

    let err = store.create_project(&new_project(" P1")).unwrap_err();
    assert!(matches!(
        err,
        StoreError::Validation(ValidationError::DuplicateProjectId(_))
    ));
    assert_eq!(store.projects().len(), 1);
}

#[test]
fn delete_missing_project_reports_not_found_and_keeps_store() {
    let mut store = new_store();
    store.create_project(&new_project("P1")).unwrap();
    let before = store.projects().to_vec();

    let err = store.delete_project(&pid("nonexistent")).unwrap_err();
    assert!(matches!(err, StoreError::NotFound(NotFound::Project(_))));
    assert_eq!(store.projects(), before.as_slice());

    store.delete_project(&pid("P1")).unwrap();
    assert!(store.projects().is_empty());
}

#[test]
fn update_progress_reads_back_every_valid_percent() {
    let mut store = new_store();
    let id = store.create_project(&new_project("P1")).unwrap();

    for percent in [0.0, 0.5, 25.0, 50.0, 99.9, 100.0] {
        store
            .update_progress(&id, Element::Foundation, percent)
            .unwrap();
        let entry = &store.project(&id).unwrap().progress_by_element[&Element::Foundation];
        assert_eq!(entry.completion_percent, percent);
        assert!(entry.last_updated.is_some());
    }
}

#[test]
fn update_progress_out_of_range_leaves_value_unchanged() {
    let mut store = new_store();
    let id = store.create_project(&new_project("P1")).unwrap();
    store.update_progress(&id, Element::Roofing, 40.0).unwrap();
    let before = store.project(&id).unwrap().progress_by_element[&Element::Roofing].clone();

    for percent in [-1.0, 100.01, f64::NAN, f64::INFINITY] {
        let err = store
            .update_progress(&id, Element::Roofing, percent)
            .unwrap_err();
        assert!(matches!(
            err,
            StoreError::Validation(ValidationError::PercentOutOfRange(_))
        ));
    }
    assert_eq!(
        store.project(&id).unwrap().progress_by_element[&Element::Roofing],
        before
    );
}

#[test]
fn update_progress_is_idempotent_for_the_same_percent() {
    let mut store = new_store();
    let id = store.create_project(&new_project("P1")).unwrap();

    store.update_progress(&id, Element::Finishes, 60.0).unwrap();
    let first = store.project(&id).unwrap().progress_by_element[&Element::Finishes].clone();
    store.update_progress(&id, Element::Finishes, 60.0).unwrap();
    let second = store.project(&id).unwrap().progress_by_element[&Element::Finishes].clone();

    assert_eq!(first.completion_percent, second.completion_percent);
    assert!(second.last_updated >= first.last_updated);
}

#[test]
fn untracked_element_is_unknown_until_tracked() {
    let config = StoreConfig {
        elements: vec![Element::Foundation, Element::Substructure],
        ..StoreConfig::default()
    };
    let mut store = ProjectStore::open(config, MemorySnapshotStore::new()).unwrap();
    let id = store.create_project(&new_project("P1")).unwrap();

    let err = store
        .update_progress(&id, Element::ElectricalWork, 10.0)
        .unwrap_err();
    assert!(matches!(
        err,
        StoreError::Validation(ValidationError::UnknownElement(Element::ElectricalWork))
    ));

    store.track_element(&id, Element::ElectricalWork).unwrap();
    store
        .update_progress(&id, Element::ElectricalWork, 10.0)
        .unwrap();
    assert_eq!(store.project(&id).unwrap().progress_by_element.len(), 3);

    let err = store.track_element(&id, Element::Foundation).unwrap_err();
    assert!(matches!(
        err,
        StoreError::Validation(ValidationError::DuplicateElement(Element::Foundation))
    ));
}

#[test]
fn overall_progress_is_mean_over_tracked_elements() {
    let config = StoreConfig {
        elements: vec![
            Element::Foundation,
            Element::Substructure,
            Element::Superstructure,
            Element::Finishes,
        ],
        ..StoreConfig::default()
    };
    let mut store = ProjectStore::open(config, MemorySnapshotStore::new()).unwrap();
    let id = store.create_project(&new_project("P1")).unwrap();

    store.update_progress(&id, Element::Foundation, 0.0).unwrap();
    store
        .update_progress(&id, Element::Substructure, 100.0)
        .unwrap();
    store
        .update_progress(&id, Element::Superstructure, 50.0)
        .unwrap();
    store.update_progress(&id, Element::Finishes, 0.0).unwrap();

    assert_eq!(store.compute_overall_progress(&id).unwrap(), 37.5);
}

#[test]
fn financials_use_fixed_basis_by_default() {
    let mut store = new_store();
    let mut input = new_project("P1");
    input.budget = 250_000.0;
    let id = store.create_project(&input).unwrap();
    store.update_progress(&id, Element::Foundation, 25.0).unwrap();
    store.update_progress(&id, Element::Roofing, 50.0).unwrap();

    let financials = store.compute_financials(&id).unwrap();
    assert_eq!(financials.basis, 100_000.0);
    assert_eq!(financials.claimable_for(Element::Foundation), Some(25_000.0));
    assert_eq!(financials.claimable_for(Element::Roofing), Some(50_000.0));
    let sum: f64 = financials.per_element.iter().map(|item| item.claimable).sum();
    assert_eq!(financials.total_claimable, sum);

    let before = store.project(&id).unwrap().clone();
    store.compute_financials(&id).unwrap();
    assert_eq!(store.project(&id).unwrap(), &before);
}

#[test]
fn financials_can_use_project_budget_as_basis() {
    let config = StoreConfig {
        value_basis: ValueBasis::ProjectBudget,
        ..StoreConfig::default()
    };
    let mut store = ProjectStore::open(config, MemorySnapshotStore::new()).unwrap();
    let mut input = new_project("P1");
    input.budget = 200_000.0;
    let id = store.create_project(&input).unwrap();
    store.update_progress(&id, Element::Foundation, 25.0).unwrap();

    let financials = store.compute_financials(&id).unwrap();
    assert_eq!(financials.claimable_for(Element::Foundation), Some(50_000.0));
    assert_eq!(financials.total_claimable, 50_000.0);
}

#[test]
fn add_task_starts_pending_and_rejects_duplicate_names() {
    let mut store = new_store();
    let id = store.create_project(&new_project("P1")).unwrap();

    let task_id = store.add_task(&id, &new_task("Pour slab")).unwrap();
    let task = &store.project(&id).unwrap().tasks[0];
    assert_eq!(task.id, task_id);
    assert_eq!(task.status, TaskStatus::Pending);
    assert!(task.comments.is_empty());

    let err = store.add_task(&id, &new_task(" Pour slab ")).unwrap_err();
    assert!(matches!(
        err,
        StoreError::Validation(ValidationError::DuplicateTaskName(name)) if name == "Pour slab"
    ));
    assert_eq!(store.project(&id).unwrap().tasks.len(), 1);
}

#[test]
fn task_status_and_comments_resolve_by_name_or_id() {
    let mut store = new_store();
    let id = store.create_project(&new_project("P1")).unwrap();
    store.add_task(&id, &new_task("Pour slab")).unwrap();
    let trusses = store.add_task(&id, &new_task("Install trusses")).unwrap();

    store
        .update_task_status(&id, "Pour slab", TaskStatus::Completed)
        .unwrap();
    store
        .update_task_status(&id, trusses, TaskStatus::InProgress)
        .unwrap();
    // Any state is reachable from any state.
    store
        .update_task_status(&id, "Pour slab", TaskStatus::Pending)
        .unwrap();

    store
        .add_task_comment(&id, "Install trusses", "crane booked")
        .unwrap();
    store
        .add_task_comment(&id, trusses, "delivery late")
        .unwrap();

    let project = store.project(&id).unwrap();
    assert_eq!(project.tasks[0].status, TaskStatus::Pending);
    assert_eq!(project.tasks[1].status, TaskStatus::InProgress);
    assert_eq!(project.tasks[1].comments, ["crane booked", "delivery late"]);

    let err = store
        .update_task_status(&id, "Paint walls", TaskStatus::Completed)
        .unwrap_err();
    assert!(matches!(
        err,
        StoreError::NotFound(NotFound::Task { key: TaskKey::Name(_), .. })
    ));
    let err = store.add_task_comment(&id, "Pour slab", "   ").unwrap_err();
    assert!(matches!(
        err,
        StoreError::Validation(ValidationError::EmptyField("comment"))
    ));
}

#[test]
fn renamed_task_keeps_its_id_and_names_stay_unique() {
    let mut store = new_store();
    let id = store.create_project(&new_project("P1")).unwrap();
    let slab = store.add_task(&id, &new_task("Pour slab")).unwrap();
    store.add_task(&id, &new_task("Install trusses")).unwrap();

    store.rename_task(&id, slab, "Pour ground slab").unwrap();
    let project = store.project(&id).unwrap();
    assert_eq!(project.tasks[0].id, slab);
    assert_eq!(project.tasks[0].name, "Pour ground slab");

    let err = store.rename_task(&id, slab, "Install trusses").unwrap_err();
    assert!(matches!(
        err,
        StoreError::Validation(ValidationError::DuplicateTaskName(_))
    ));
    // Renaming to its own current name is allowed.
    store.rename_task(&id, slab, "Pour ground slab").unwrap();

    let removed = store.remove_task(&id, "Pour ground slab").unwrap();
    assert_eq!(removed.id, slab);
    assert_eq!(store.project(&id).unwrap().tasks.len(), 1);
}

#[test]
fn documents_are_addressed_by_id_or_exact_content() {
    let mut store = new_store();
    let id = store.create_project(&new_project("P1")).unwrap();

    let upload = |filename: &str, content: &[u8]| NewDocument {
        filename: filename.to_string(),
        mime_type: "application/pdf".to_string(),
        title: Some("  ".to_string()),
        description: Some("Signed copy".to_string()),
        category: DocumentCategory::Contracts,
        content: content.to_vec(),
    };
    let first = store.upload_document(&id, upload("contract.pdf", b"%PDF-1")).unwrap();
    let second = store.upload_document(&id, upload("contract.pdf", b"%PDF-2")).unwrap();
    assert_ne!(first, second);

    let stored = &store.project(&id).unwrap().documents[0];
    assert_eq!(stored.title, None);
    assert_eq!(stored.description.as_deref(), Some("Signed copy"));

    let removed = store
        .delete_document(
            &id,
            DocumentKey::Exact {
                filename: "contract.pdf".to_string(),
                content: b"%PDF-2".to_vec(),
            },
        )
        .unwrap();
    assert_eq!(removed.id, second);

    store.delete_document(&id, first).unwrap();
    assert!(store.project(&id).unwrap().documents.is_empty());

    let err = store.delete_document(&id, first).unwrap_err();
    assert!(matches!(
        err,
        StoreError::NotFound(NotFound::Document { .. })
    ));
}

#[test]
fn add_claim_returns_position_and_defaults_notes() {
    let mut store = new_store();
    let id = store.create_project(&new_project("P1")).unwrap();

    assert_eq!(store.add_claim(&id, &new_claim(20_000.0)).unwrap(), 0);
    let mut with_notes = new_claim(5_000.0);
    with_notes.notes = Some("Retention release".to_string());
    assert_eq!(store.add_claim(&id, &with_notes).unwrap(), 1);

    let claims = &store.project(&id).unwrap().interim_claims;
    assert_eq!(claims[0].notes, DEFAULT_CLAIM_NOTES);
    assert_eq!(claims[0].status, ClaimStatus::Pending);
    assert_eq!(claims[1].notes, "Retention release");

    let err = store.add_claim(&id, &new_claim(-1.0)).unwrap_err();
    assert!(matches!(
        err,
        StoreError::Validation(ValidationError::NegativeAmount { .. })
    ));
}

#[test]
fn update_claim_out_of_range_index_is_reported() {
    let mut store = new_store();
    let id = store.create_project(&new_project("P1")).unwrap();
    store.add_claim(&id, &new_claim(1_000.0)).unwrap();
    store.add_claim(&id, &new_claim(2_000.0)).unwrap();

    let err = store
        .update_claim(&id, ClaimKey::Index(5), ClaimStatus::Approved, None)
        .unwrap_err();
    assert!(matches!(err, StoreError::OutOfRange { index: 5, len: 2 }));

    let err = store
        .update_claim(&id, ClaimKey::Id(999), ClaimStatus::Approved, None)
        .unwrap_err();
    assert!(matches!(err, StoreError::NotFound(NotFound::Claim { id: 999, .. })));
}

#[test]
fn claim_ids_survive_removal_of_earlier_claims() {
    let mut store = new_store();
    let id = store.create_project(&new_project("P1")).unwrap();
    store.add_claim(&id, &new_claim(1_000.0)).unwrap();
    store.add_claim(&id, &new_claim(2_000.0)).unwrap();
    let first_id = store.project(&id).unwrap().interim_claims[0].id;
    let second_id = store.project(&id).unwrap().interim_claims[1].id;

    store.remove_claim(&id, first_id).unwrap();
    store
        .update_claim(
            &id,
            ClaimKey::Id(second_id),
            ClaimStatus::Rejected,
            Some("Missing valuation"),
        )
        .unwrap();

    let claim = &store.project(&id).unwrap().interim_claims[0];
    assert_eq!(claim.id, second_id);
    assert_eq!(claim.status, ClaimStatus::Rejected);
    assert_eq!(claim.notes, "Missing valuation");

    // A new claim never reuses a removed id.
    store.add_claim(&id, &new_claim(3_000.0)).unwrap();
    let newest = store.project(&id).unwrap().interim_claims[1].id;
    assert!(newest > second_id);
}

#[test]
fn filters_preserve_order_and_ignore_case() {
    let mut store = new_store();
    let id = store.create_project(&new_project("P1")).unwrap();
    for name in ["Pour slab", "Install trusses", "Slab curing"] {
        store.add_task(&id, &new_task(name)).unwrap();
    }
    let mut noted = new_claim(1_000.0);
    noted.notes = Some("Foundation draw".to_string());
    store.add_claim(&id, &noted).unwrap();
    store.add_claim(&id, &new_claim(2_000.0)).unwrap();
    store
        .update_claim(&id, ClaimKey::Index(1), ClaimStatus::Approved, None)
        .unwrap();

    let tasks: Vec<&str> = store
        .filter_tasks(&id, "slab")
        .unwrap()
        .into_iter()
        .map(|task| task.name.as_str())
        .collect();
    assert_eq!(tasks, ["Pour slab", "Slab curing"]);

    let approved = store.filter_claims(&id, "APPROVED").unwrap();
    assert_eq!(approved.len(), 1);
    assert_eq!(approved[0].amount, 2_000.0);
    assert_eq!(store.filter_claims(&id, "foundation").unwrap().len(), 1);

    let err = store.filter_tasks(&pid("P9"), "slab").unwrap_err();
    assert!(matches!(err, StoreError::NotFound(NotFound::Project(_))));
}

#[test]
fn summary_reports_remaining_budget_and_task_counts() {
    let mut store = new_store();
    let id = store.create_project(&new_project("P1")).unwrap();
    store.add_task(&id, &new_task("Pour slab")).unwrap();
    store.add_task(&id, &new_task("Install trusses")).unwrap();
    store
        .update_task_status(&id, "Pour slab", TaskStatus::Completed)
        .unwrap();
    store.add_claim(&id, &new_claim(30_000.0)).unwrap();
    store
        .update_claim(&id, ClaimKey::Index(0), ClaimStatus::Approved, None)
        .unwrap();
    store.update_progress(&id, Element::Foundation, 60.0).unwrap();

    let summary = store.summary(&id).unwrap();
    assert_eq!(summary.remaining_budget, 70_000.0);
    assert_eq!(summary.task_counts.completed, 1);
    assert_eq!(summary.task_counts.pending, 1);
    assert_eq!(summary.claim_count, 1);
    assert_eq!(summary.overall_progress, 10.0);
    assert_eq!(summary.total_claimable, 60_000.0);
    assert_eq!(store.summaries().len(), 1);
}

#[test]
fn snapshot_round_trip_is_lossless() {
    let mut store = new_store();
    let id = store.create_project(&new_project("P1")).unwrap();
    store.create_project(&new_project("P2")).unwrap();
    store.update_progress(&id, Element::Substructure, 33.3).unwrap();
    store.add_task(&id, &new_task("Pour slab")).unwrap();
    store.add_task_comment(&id, "Pour slab", "rebar inspected").unwrap();
    store
        .upload_document(
            &id,
            NewDocument {
                filename: "plan.dwg".to_string(),
                mime_type: "application/acad".to_string(),
                title: Some("Ground floor".to_string()),
                description: None,
                category: DocumentCategory::Plans,
                content: vec![0, 159, 146, 150, 255],
            },
        )
        .unwrap();
    store.add_claim(&id, &new_claim(12_345.67)).unwrap();

    let bytes = store.snapshot_bytes().unwrap();
    assert_eq!(decode_snapshot(&bytes).unwrap(), store.projects());

    let reopened =
        ProjectStore::open(StoreConfig::default(), MemorySnapshotStore::with_bytes(bytes))
            .unwrap();
    assert_eq!(reopened.projects(), store.projects());
}
