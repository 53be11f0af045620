use super::*;

#[derive(Debug, Clone, PartialEq, Eq)]
struct Card {
    id: String,
    title: String,
    done: bool,
}

#[derive(Debug, Clone, Default)]
struct CardPatch {
    title: Option<String>,
    done: Option<bool>,
}

impl Record for Card {
    type Id = String;
    type Patch = CardPatch;

    fn id(&self) -> String {
        self.id.clone()
    }

    fn apply_patch(&mut self, patch: &CardPatch) {
        if let Some(title) = &patch.title {
            self.title = title.clone();
        }
        if let Some(done) = patch.done {
            self.done = done;
        }
    }
}

fn card(id: &str, title: &str) -> Card {
    Card {
        id: id.to_string(),
        title: title.to_string(),
        done: false,
    }
}

fn draft(title: &str) -> Card {
    card("", title)
}

fn confirmed(id: &str) -> RecordKey<String> {
    RecordKey::Confirmed(id.to_string())
}

fn titles(collection: &OptimisticCollection<Card>) -> Vec<String> {
    collection.records().map(|c| c.title.clone()).collect()
}

fn seeded() -> OptimisticCollection<Card> {
    OptimisticCollection::from_confirmed(vec![
        card("a", "alpha"),
        card("b", "beta"),
        card("c", "gamma"),
    ])
}

#[test]
fn create_round_trip_replaces_placeholder_in_place() {
    let mut collection = seeded();
    let first = collection.apply_create(draft("one"));
    let second = collection.apply_create(draft("two"));
    assert_ne!(first, second);
    assert_eq!(collection.pending_count(), 2);
    assert_eq!(
        collection.state_of(&RecordKey::Pending(first)),
        Some(ItemState::Pending)
    );

    // "one" sits at index 1 behind the newer "two" placeholder.
    collection.confirm_create(first, card("srv-1", "one (saved)"));

    assert_eq!(
        titles(&collection),
        vec!["two", "one (saved)", "alpha", "beta", "gamma"]
    );
    assert_eq!(collection.get(&RecordKey::Pending(first)), None);
    assert_eq!(
        collection.get(&confirmed("srv-1")),
        Some(&card("srv-1", "one (saved)"))
    );
    assert_eq!(collection.pending_count(), 1);
}

#[test]
fn create_confirmation_after_refetch_does_not_duplicate() {
    let mut collection = seeded();
    let pending = collection.apply_create(draft("one"));
    collection.replace_confirmed(vec![card("srv-1", "one"), card("a", "alpha")]);
    assert_eq!(titles(&collection), vec!["one", "one", "alpha"]);

    collection.confirm_create(pending, card("srv-1", "one"));

    assert_eq!(titles(&collection), vec!["one", "alpha"]);
    assert_eq!(collection.pending_count(), 0);
}

#[test]
fn create_confirmation_without_placeholder_prepends() {
    let mut collection = seeded();
    let pending = collection.apply_create(draft("one"));
    collection.reject_create(pending, "offline");
    collection.confirm_create(pending, card("srv-1", "one"));
    assert_eq!(titles(&collection), vec!["one", "alpha", "beta", "gamma"]);
}

#[test]
fn create_rejection_restores_previous_state() {
    let mut collection = seeded();
    let before: Vec<Card> = collection.records().cloned().collect();

    let pending = collection.apply_create(draft("doomed"));
    let dropped = collection.reject_create(pending, "quota exceeded");

    assert_eq!(dropped, Some(draft("doomed")));
    let after: Vec<Card> = collection.records().cloned().collect();
    assert_eq!(after, before);
    assert_eq!(collection.pending_count(), 0);
    assert_eq!(collection.reject_create(pending, "again"), None);
}

#[test]
fn rejected_delete_restores_once_at_original_index() {
    let mut collection = seeded();
    let removed = collection.apply_delete(&confirmed("b")).expect("delete");
    assert_eq!(removed.index, 1);
    assert_eq!(titles(&collection), vec!["alpha", "gamma"]);

    assert!(collection.reject_delete(&removed));
    assert!(!collection.reject_delete(&removed));

    assert_eq!(titles(&collection), vec!["alpha", "beta", "gamma"]);
    assert_eq!(collection.deleting().count(), 0);
}

#[test]
fn rejected_delete_clamps_index_when_collection_shrank() {
    let mut collection = seeded();
    let removed = collection.apply_delete(&confirmed("c")).expect("delete");
    collection.apply_delete(&confirmed("b")).expect("delete");
    collection.reject_delete(&removed);
    assert_eq!(titles(&collection), vec!["alpha", "gamma"]);
}

#[test]
fn refetch_does_not_resurrect_record_being_deleted() {
    let mut collection = seeded();
    let removed = collection.apply_delete(&confirmed("a")).expect("delete");
    collection.replace_confirmed(vec![
        card("a", "alpha v2"),
        card("b", "beta"),
        card("c", "gamma"),
    ]);
    assert_eq!(titles(&collection), vec!["beta", "gamma"]);

    // Restoring picks up the refreshed base.
    collection.reject_delete(&removed);
    assert_eq!(titles(&collection), vec!["alpha v2", "beta", "gamma"]);
}

#[test]
fn confirmed_delete_forgets_marker() {
    let mut collection = seeded();
    let removed = collection.apply_delete(&confirmed("a")).expect("delete");
    collection.confirm_delete(&removed.id);
    assert!(!collection.reject_delete(&removed));
    collection.replace_confirmed(vec![card("a", "alpha")]);
    assert_eq!(titles(&collection), vec!["alpha"]);
}

#[test]
fn pending_records_refuse_mutation_and_delete() {
    let mut collection = seeded();
    let pending = collection.apply_create(draft("uploading"));
    let key = RecordKey::Pending(pending);

    let mutate = collection.apply_mutate(
        &key,
        CardPatch {
            done: Some(true),
            ..CardPatch::default()
        },
    );
    assert_eq!(mutate.err(), Some(SyncError::StillPending));
    assert_eq!(
        collection.apply_delete(&key).err(),
        Some(SyncError::StillPending)
    );
    assert_eq!(collection.get(&key), Some(&draft("uploading")));
    assert_eq!(collection.len(), 4);
}

#[test]
fn unknown_keys_are_not_found() {
    let mut collection = seeded();
    assert_eq!(
        collection
            .apply_mutate(&confirmed("zzz"), CardPatch::default())
            .err(),
        Some(SyncError::NotFound)
    );
    let pending = collection.apply_create(draft("gone"));
    collection.reject_create(pending, "nope");
    assert_eq!(
        collection.apply_delete(&RecordKey::Pending(pending)).err(),
        Some(SyncError::NotFound)
    );
}

#[test]
fn rejected_mutation_restores_previous_snapshot() {
    let mut collection = seeded();
    let ticket = collection
        .apply_mutate(
            &confirmed("a"),
            CardPatch {
                done: Some(true),
                ..CardPatch::default()
            },
        )
        .expect("mutate");
    assert!(collection.get(&confirmed("a")).expect("a").done);

    assert!(collection.reject_mutate(&ticket));
    assert_eq!(collection.get(&confirmed("a")), Some(&ticket.previous));
    assert!(!collection.reject_mutate(&ticket));
}

#[test]
fn overlapping_mutations_roll_back_only_the_failed_patch() {
    let mut collection = seeded();
    let rename = collection
        .apply_mutate(
            &confirmed("a"),
            CardPatch {
                title: Some("renamed".to_string()),
                ..CardPatch::default()
            },
        )
        .expect("rename");
    let toggle = collection
        .apply_mutate(
            &confirmed("a"),
            CardPatch {
                done: Some(true),
                ..CardPatch::default()
            },
        )
        .expect("toggle");
    assert_eq!(collection.entries()[0].in_flight(), 2);

    // The rename fails after the toggle was issued; the toggle survives.
    collection.reject_mutate(&rename);
    let current = collection.get(&confirmed("a")).expect("a");
    assert_eq!(current.title, "alpha");
    assert!(current.done);

    collection.confirm_mutate(&toggle);
    assert_eq!(collection.entries()[0].in_flight(), 0);
    assert!(collection.get(&confirmed("a")).expect("a").done);
}

#[test]
fn confirmed_mutation_survives_later_rejection() {
    let mut collection = seeded();
    let first = collection
        .apply_mutate(
            &confirmed("b"),
            CardPatch {
                title: Some("first".to_string()),
                ..CardPatch::default()
            },
        )
        .expect("first");
    let second = collection
        .apply_mutate(
            &confirmed("b"),
            CardPatch {
                done: Some(true),
                ..CardPatch::default()
            },
        )
        .expect("second");

    collection.confirm_mutate(&first);
    collection.reject_mutate(&second);

    let current = collection.get(&confirmed("b")).expect("b");
    assert_eq!(current.title, "first");
    assert!(!current.done);
}

#[test]
fn server_record_rebases_remaining_patches() {
    let mut collection = seeded();
    let rename = collection
        .apply_mutate(
            &confirmed("c"),
            CardPatch {
                title: Some("local".to_string()),
                ..CardPatch::default()
            },
        )
        .expect("rename");
    let _toggle = collection
        .apply_mutate(
            &confirmed("c"),
            CardPatch {
                done: Some(true),
                ..CardPatch::default()
            },
        )
        .expect("toggle");

    collection.confirm_mutate_with(&rename, card("c", "server title"));

    let current = collection.get(&confirmed("c")).expect("c");
    assert_eq!(current.title, "server title");
    assert!(current.done);
}

#[test]
fn refetch_keeps_pending_first_and_reapplies_in_flight_patches() {
    let mut collection = seeded();
    let _ticket = collection
        .apply_mutate(
            &confirmed("b"),
            CardPatch {
                done: Some(true),
                ..CardPatch::default()
            },
        )
        .expect("mutate");
    collection.apply_create(draft("new"));

    collection.replace_confirmed(vec![card("b", "beta v2"), card("d", "delta")]);

    assert_eq!(titles(&collection), vec!["new", "beta v2", "delta"]);
    assert!(collection.get(&confirmed("b")).expect("b").done);
    assert_eq!(collection.entries()[0].state(), ItemState::Pending);
}

#[test]
fn mutation_on_record_being_deleted_still_resolves() {
    let mut collection = seeded();
    let ticket = collection
        .apply_mutate(
            &confirmed("a"),
            CardPatch {
                title: Some("edited".to_string()),
                ..CardPatch::default()
            },
        )
        .expect("mutate");
    let removed = collection.apply_delete(&confirmed("a")).expect("delete");
    assert_eq!(removed.record.title, "edited");

    assert!(collection.reject_mutate(&ticket));
    collection.reject_delete(&removed);
    assert_eq!(collection.get(&confirmed("a")), Some(&card("a", "alpha")));
}

#[test]
fn pending_id_display_is_tagged() {
    let mut collection: OptimisticCollection<Card> = OptimisticCollection::new();
    let pending = collection.apply_create(draft("x"));
    assert!(pending.to_string().starts_with("pending-"));
}

#[test]
fn reserved_pending_id_adds_no_row_and_is_never_reused() {
    let mut collection = seeded();
    let reserved = collection.reserve_pending();
    assert_eq!(collection.len(), 3);
    assert_eq!(collection.pending_count(), 0);

    let created = collection.apply_create(draft("one"));
    assert_ne!(created, reserved);
    // Confirming the reserved id inserts the record without touching the placeholder.
    collection.confirm_create(reserved, card("r", "reserved"));
    assert_eq!(collection.pending_count(), 1);
    assert_eq!(
        collection.state_of(&RecordKey::Confirmed("r".to_string())),
        Some(ItemState::Confirmed)
    );
}
