use super::*;
use shared::{domain::FieldPath, error::ErrorKind};

fn sheet(name: &str) -> SheetFile {
    SheetFile::new(name, b"%PDF-1.4".to_vec())
}

#[test]
fn starts_with_one_default_tempo_row() {
    let form = FormModel::default();
    let rows = form.tempo_overrides();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].tempo, Some(DEFAULT_TEMPO));
    assert_eq!(rows[0].measure, Some(1));
    assert!(!form.values().page_range.enabled);
    assert!(form.attached_file().is_none());
    assert!(form.errors().is_empty());
    assert!(!form.is_dirty());
    assert!(form.is_pristine_and_empty());
}

#[test]
fn removing_the_only_tempo_row_is_a_no_op() {
    let mut form = FormModel::default();
    let before = form.snapshot();
    let only = form.tempo_overrides()[0].id;

    assert_eq!(form.remove_tempo_override(only), Ok(false));
    assert_eq!(form.snapshot(), before);
    assert!(!form.can_remove_tempo_override());
}

#[test]
fn added_rows_continue_measure_numbering() {
    let mut form = FormModel::default();
    let second = form.add_tempo_override();
    let third = form.add_tempo_override();

    let rows = form.tempo_overrides();
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[1].id, second);
    assert_eq!(rows[1].measure, Some(2));
    assert_eq!(rows[1].force, Some(false));
    assert_eq!(rows[2].id, third);
    assert_eq!(rows[2].measure, Some(3));
    assert!(form.is_dirty());
}

#[test]
fn errors_stay_keyed_to_their_row_after_removal() {
    let mut form = FormModel::default();
    let first = form.tempo_overrides()[0].id;
    let second = form.add_tempo_override();
    let third = form.add_tempo_override();

    form.set_field(FormField::Tempo(third), FieldValue::Integer(Some(999)))
        .expect("set tempo");
    assert_eq!(
        form.errors().get(&FieldPath::Tempo(third)),
        Some(&ErrorKind::AboveMax)
    );

    assert_eq!(form.remove_tempo_override(second), Ok(true));
    assert_eq!(
        form.errors().get(&FieldPath::Tempo(third)),
        Some(&ErrorKind::AboveMax)
    );
    assert!(!form.errors().contains_key(&FieldPath::Tempo(first)));
    assert!(!form.errors().contains_key(&FieldPath::Tempo(second)));
}

#[test]
fn set_field_revalidates_and_marks_dirty() {
    let mut form = FormModel::default();
    form.set_field(FormField::MidiFileName, FieldValue::Text("  ".to_string()))
        .expect("set name");

    assert!(form.is_dirty());
    assert_eq!(
        form.errors().get(&FieldPath::MidiFileName),
        Some(&ErrorKind::Required)
    );

    form.set_field(FormField::MidiFileName, FieldValue::Text("etude".to_string()))
        .expect("set name");
    assert!(!form.errors().contains_key(&FieldPath::MidiFileName));
}

#[test]
fn restoring_initial_values_clears_dirty_flag() {
    let mut form = FormModel::default();
    form.set_field(FormField::PageRangeEnabled, FieldValue::Flag(true))
        .expect("enable range");
    assert!(form.is_dirty());

    form.set_field(FormField::PageRangeEnabled, FieldValue::Flag(false))
        .expect("disable range");
    assert!(!form.is_dirty());
}

#[test]
fn rejects_unknown_rows_and_mismatched_values() {
    let mut form = FormModel::default();
    let before = form.snapshot();

    assert_eq!(
        form.set_field(FormField::Tempo(RowId(77)), FieldValue::Integer(Some(90))),
        Err(FormError::UnknownRow(RowId(77)))
    );
    assert_eq!(
        form.set_field(FormField::PageRangeStart, FieldValue::Flag(true)),
        Err(FormError::TypeMismatch {
            field: FormField::PageRangeStart,
            expected: "integer",
        })
    );
    assert_eq!(
        form.remove_tempo_override(RowId(77)),
        Err(FormError::UnknownRow(RowId(77)))
    );
    assert_eq!(form.snapshot(), before);
}

#[test]
fn integer_input_clears_on_garbage() {
    assert_eq!(FieldValue::integer_input(" 42 "), FieldValue::Integer(Some(42)));
    assert_eq!(FieldValue::integer_input("4x"), FieldValue::Integer(None));
    assert_eq!(FieldValue::integer_input(""), FieldValue::Integer(None));
}

#[test]
fn page_range_fields_validate_only_when_enabled() {
    let mut form = FormModel::default();
    form.set_field(FormField::PageRangeStart, FieldValue::Integer(Some(0)))
        .expect("set start");
    assert!(!form.errors().contains_key(&FieldPath::PageRangeStart));

    form.set_field(FormField::PageRangeEnabled, FieldValue::Flag(true))
        .expect("enable range");
    assert_eq!(
        form.errors().get(&FieldPath::PageRangeStart),
        Some(&ErrorKind::BelowMin)
    );
    assert_eq!(
        form.errors().get(&FieldPath::PageRangeEnd),
        Some(&ErrorKind::Required)
    );
}

#[test]
fn attaching_a_sheet_derives_the_midi_name() {
    let mut form = FormModel::default();
    form.attach_file(Some(sheet("sonata.pdf")));
    assert_eq!(form.values().midi_file_name, "sonata");
    assert_eq!(
        form.attached_file().map(SheetFile::file_name),
        Some("sonata.pdf")
    );

    form.attach_file(None);
    assert_eq!(form.values().midi_file_name, "");
    assert!(form.attached_file().is_none());
}

#[test]
fn default_policy_overwrites_a_manual_name() {
    let mut form = FormModel::default();
    form.set_field(FormField::MidiFileName, FieldValue::Text("my take".to_string()))
        .expect("set name");
    form.attach_file(Some(sheet("sonata.pdf")));
    assert_eq!(form.values().midi_file_name, "sonata");
}

#[test]
fn preserve_policy_keeps_a_manual_name() {
    let mut form = FormModel::new(FormConfig {
        name_policy: NamePolicy::PreserveManualEdit,
        ..FormConfig::default()
    });
    form.attach_file(Some(sheet("sonata.pdf")));
    assert_eq!(form.values().midi_file_name, "sonata");

    form.set_field(FormField::MidiFileName, FieldValue::Text("my take".to_string()))
        .expect("set name");
    form.attach_file(Some(sheet("fugue.png")));
    assert_eq!(form.values().midi_file_name, "my take");

    form.attach_file(None);
    assert_eq!(form.values().midi_file_name, "my take");
}

#[test]
fn reset_restores_defaults_and_is_idempotent() {
    let mut form = FormModel::default();
    form.attach_file(Some(sheet("sonata.pdf")));
    form.add_tempo_override();
    form.set_field(FormField::PageRangeEnabled, FieldValue::Flag(true))
        .expect("enable range");
    assert!(!form.errors().is_empty());

    form.reset();
    let after_first = form.snapshot();
    assert_eq!(after_first, FormModel::default().snapshot());
    assert!(form.is_pristine_and_empty());

    form.reset();
    assert_eq!(form.snapshot(), after_first);
}

#[test]
fn snapshot_is_detached_from_live_state() {
    let mut form = FormModel::default();
    form.attach_file(Some(sheet("sonata.pdf")));
    let snapshot = form.snapshot();

    form.set_field(FormField::MidiFileName, FieldValue::Text("changed".to_string()))
        .expect("set name");
    assert_eq!(snapshot.values.midi_file_name, "sonata");
}

#[test]
fn snapshot_requires_a_file_and_no_errors() {
    let mut form = FormModel::default();
    form.set_field(FormField::MidiFileName, FieldValue::Text("etude".to_string()))
        .expect("set name");
    assert!(!form.snapshot().is_submittable());

    form.attach_file(Some(sheet("etude.png")));
    assert!(form.snapshot().is_submittable());

    let row = form.tempo_overrides()[0].id;
    form.set_field(FormField::Measure(row), FieldValue::Integer(None))
        .expect("clear measure");
    let snapshot = form.snapshot();
    assert!(!snapshot.is_submittable());
    assert_eq!(snapshot.tempo_payloads(), None);
}

#[test]
fn explicit_validate_reports_untouched_fields() {
    let mut form = FormModel::default();
    assert!(form.errors().is_empty());
    let errors = form.validate();
    assert_eq!(
        errors.get(&FieldPath::MidiFileName),
        Some(&ErrorKind::Required)
    );
}
