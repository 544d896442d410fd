mod common;

use common::{admin, at, d, dept, management, supervisor, worker};
use loomstat::core::access::CapabilityTable;
use loomstat::core::workflow::{FlowWorkflowEngine, validate_row};
use loomstat::errors::AppError;
use loomstat::models::flow::{
    BatchQuery, FlowFilter, FlowRowDraft, FlowState, OutboundFlowBatch, Party,
};
use loomstat::models::role::Department;

fn draft(reference: &str, units: i64) -> FlowRowDraft {
    FlowRowDraft {
        date: Some(d("2026-03-18")),
        line: Some("L1".into()),
        reference: Some(reference.into()),
        units: Some(units),
        standard_time: Some(1.25),
        ..FlowRowDraft::default()
    }
}

fn stored(id: i64, from: Department, to: Department, state: FlowState) -> OutboundFlowBatch {
    OutboundFlowBatch {
        id,
        sender: Party::new("s", from),
        receiver: Party::new("r", to),
        filter: FlowFilter::default(),
        rows: Vec::new(),
        total_rows: 1,
        state,
        created_at: at("2026-03-18 09:00:00"),
        updated_at: at("2026-03-18 09:00:00"),
    }
}

#[test]
fn empty_batch_is_rejected() {
    let gate = CapabilityTable::default();
    let engine = FlowWorkflowEngine::new(&gate);

    let err = engine
        .create_batch(
            &supervisor(),
            Department::Cutting,
            Party::new("q", Department::Quality),
            FlowFilter::default(),
            Vec::new(),
            at("2026-03-18 09:00:00"),
        )
        .unwrap_err();
    assert!(matches!(err, AppError::EmptyBatch));
}

#[test]
fn one_bad_row_rejects_the_batch() {
    let gate = CapabilityTable::default();
    let engine = FlowWorkflowEngine::new(&gate);

    let err = engine
        .create_batch(
            &supervisor(),
            Department::Cutting,
            Party::new("q", Department::Quality),
            FlowFilter::default(),
            vec![draft("T-1", 10), draft("T-2", 0), draft("T-3", 4)],
            at("2026-03-18 09:00:00"),
        )
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidRow { index: 2, .. }));
}

#[test]
fn row_validation_names_the_missing_field() {
    let missing_ref = FlowRowDraft {
        reference: Some("   ".into()),
        ..draft("x", 1)
    };
    let err = validate_row(4, missing_ref).unwrap_err();
    assert!(matches!(err, AppError::InvalidRow { index: 4, ref reason } if reason.contains("reference")));

    let negative = draft("T-9", -3);
    assert!(validate_row(1, negative).is_err());

    let no_date = FlowRowDraft {
        date: None,
        ..draft("T-9", 3)
    };
    assert!(validate_row(1, no_date).is_err());

    let ok = validate_row(1, draft("T-9", 3)).unwrap();
    assert_eq!(ok.units, 3);
    assert_eq!(ok.observation, "");
}

#[test]
fn legacy_ticket_key_is_accepted() {
    let raw = r#"{"date":"2026-03-18","line":"L1","ficket":"T-7","units":5}"#;
    let row: FlowRowDraft = serde_json::from_str(raw).unwrap();
    assert_eq!(row.reference.as_deref(), Some("T-7"));
}

#[test]
fn department_creates_only_from_its_own_department() {
    let gate = CapabilityTable::default();
    let engine = FlowWorkflowEngine::new(&gate);
    let cutting = dept("carla", Department::Cutting);

    let batch = engine
        .create_batch(
            &cutting,
            Department::Cutting,
            Party::new("q", Department::Quality),
            FlowFilter::default(),
            vec![draft("T-1", 10)],
            at("2026-03-18 09:00:00"),
        )
        .unwrap();
    assert_eq!(batch.sender, Party::new("carla", Department::Cutting));
    assert_eq!(batch.rows.len(), 1);

    let err = engine
        .create_batch(
            &cutting,
            Department::Sewing,
            Party::new("q", Department::Quality),
            FlowFilter::default(),
            vec![draft("T-1", 10)],
            at("2026-03-18 09:00:00"),
        )
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden));
}

#[test]
fn forbidden_comes_before_empty_batch() {
    let gate = CapabilityTable::default();
    let engine = FlowWorkflowEngine::new(&gate);

    let err = engine
        .create_batch(
            &worker("ana"),
            Department::Cutting,
            Party::new("q", Department::Quality),
            FlowFilter::default(),
            Vec::new(),
            at("2026-03-18 09:00:00"),
        )
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden));
}

#[test]
fn transitions_follow_the_table() {
    let gate = CapabilityTable::default();
    let engine = FlowWorkflowEngine::new(&gate);
    let pending = stored(1, Department::Cutting, Department::Quality, FlowState::Pending);

    let err = engine
        .check_transition(&supervisor(), &pending, FlowState::Processed)
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidTransition { .. }));

    assert_eq!(
        engine.check_transition(&supervisor(), &pending, FlowState::Reviewed).unwrap(),
        FlowState::Pending
    );

    let reviewed = stored(1, Department::Cutting, Department::Quality, FlowState::Reviewed);
    for target in [FlowState::Reviewed, FlowState::Pending] {
        let err = engine.check_transition(&supervisor(), &reviewed, target).unwrap_err();
        assert!(matches!(err, AppError::InvalidTransition { .. }));
    }

    let processed = stored(1, Department::Cutting, Department::Quality, FlowState::Processed);
    assert!(processed.state.is_terminal());
    assert!(engine.check_transition(&admin(), &processed, FlowState::Processed).is_err());
}

#[test]
fn only_the_receiver_side_advances() {
    let gate = CapabilityTable::default();
    let engine = FlowWorkflowEngine::new(&gate);
    let batch = stored(1, Department::Cutting, Department::Quality, FlowState::Pending);

    let quality = dept("quinn", Department::Quality);
    assert!(engine.check_transition(&quality, &batch, FlowState::Reviewed).is_ok());

    let cutting = dept("carla", Department::Cutting);
    let err = engine.check_transition(&cutting, &batch, FlowState::Reviewed).unwrap_err();
    assert!(matches!(err, AppError::Forbidden));

    let err = engine.check_transition(&management(), &batch, FlowState::Reviewed).unwrap_err();
    assert!(matches!(err, AppError::Forbidden));
}

#[test]
fn department_receiver_is_not_matched_by_user_name() {
    let gate = CapabilityTable::default();
    let engine = FlowWorkflowEngine::new(&gate);
    let mut batch = stored(1, Department::Cutting, Department::Sewing, FlowState::Pending);
    batch.receiver = Party::department_only(Department::Sewing);

    let impostor = dept("sewing", Department::Warehouse);
    let err = engine.check_transition(&impostor, &batch, FlowState::Reviewed).unwrap_err();
    assert!(matches!(err, AppError::Forbidden));
    assert!(!engine.is_visible(&impostor, &batch));

    let sewing = dept("sam", Department::Sewing);
    assert!(engine.check_transition(&sewing, &batch, FlowState::Reviewed).is_ok());
}

#[test]
fn listing_without_read_capability_is_forbidden_for_any_filter() {
    let gate = CapabilityTable::default();
    let engine = FlowWorkflowEngine::new(&gate);
    let batches = vec![stored(1, Department::Cutting, Department::Quality, FlowState::Pending)];

    for query in [
        BatchQuery::default(),
        BatchQuery {
            state: Some(FlowState::Pending),
            ..BatchQuery::default()
        },
        BatchQuery {
            from: Some(d("2030-01-01")),
            ..BatchQuery::default()
        },
    ] {
        let err = engine.list_batches(&worker("ana"), batches.clone(), &query).unwrap_err();
        assert!(matches!(err, AppError::Forbidden));

        let empty = engine.list_batches(&worker("ana"), Vec::new(), &query).unwrap_err();
        assert!(matches!(empty, AppError::Forbidden));
    }
}

#[test]
fn departments_see_only_batches_they_take_part_in() {
    let gate = CapabilityTable::default();
    let engine = FlowWorkflowEngine::new(&gate);
    let batches = vec![
        stored(1, Department::Cutting, Department::Quality, FlowState::Pending),
        stored(2, Department::Sewing, Department::Cutting, FlowState::Reviewed),
        stored(3, Department::Sewing, Department::Finishing, FlowState::Pending),
    ];

    let cutting = dept("carla", Department::Cutting);
    let ids: Vec<_> = engine
        .list_batches(&cutting, batches.clone(), &BatchQuery::default())
        .unwrap()
        .iter()
        .map(|b| b.id)
        .collect();
    assert_eq!(ids, [1, 2]);

    let pending_only = BatchQuery {
        state: Some(FlowState::Pending),
        ..BatchQuery::default()
    };
    let ids: Vec<_> = engine
        .list_batches(&management(), batches.clone(), &pending_only)
        .unwrap()
        .iter()
        .map(|b| b.id)
        .collect();
    assert_eq!(ids, [1, 3]);

    let err = engine
        .ensure_visible(&cutting, 3, batches.get(2))
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden));
}

#[test]
fn missing_batch_looks_forbidden_to_scoped_callers() {
    let gate = CapabilityTable::default();
    let engine = FlowWorkflowEngine::new(&gate);

    let err = engine
        .ensure_visible(&dept("carla", Department::Cutting), 99, None)
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden));

    let err = engine.ensure_visible(&supervisor(), 99, None).unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}
