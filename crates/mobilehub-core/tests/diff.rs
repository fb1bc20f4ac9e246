use mobilehub_core::diff::{actionable, reconcile};
use mobilehub_core::{DiffMark, Diffed};

#[derive(Debug, Clone, PartialEq)]
struct Item {
    key: &'static str,
    value: u32,
}

fn item(key: &'static str, value: u32) -> Item {
    Item { key, value }
}

fn by_key(d: &Item, current: &[Item]) -> Option<usize> {
    current.iter().position(|c| c.key == d.key)
}

fn same(a: &Item, b: &Item) -> bool {
    a.value == b.value
}

#[test]
fn every_entity_is_marked_exactly_once() {
    let dev = vec![item("a", 1), item("b", 2), item("c", 3)];
    let current = vec![item("b", 2), item("c", 30), item("d", 4)];

    let all = reconcile(&dev, &current, by_key, same);
    let marks: Vec<_> = all.iter().map(|d| (d.entity().key, d.mark())).collect();
    assert_eq!(
        marks,
        vec![
            ("a", DiffMark::Create),
            ("b", DiffMark::None),
            ("c", DiffMark::Update),
            ("d", DiffMark::Delete),
        ]
    );
}

#[test]
fn update_retains_dev_side() {
    let all = reconcile(&[item("c", 3)], &[item("c", 30)], by_key, same);
    match &all[0] {
        Diffed::Update { dev, current } => {
            assert_eq!(dev.value, 3);
            assert_eq!(current.value, 30);
        }
        other => panic!("expected update, got {other:?}"),
    }
    assert_eq!(all[0].entity().value, 3);
}

#[test]
fn actionable_drops_unchanged() {
    let all = reconcile(&[item("a", 1)], &[item("a", 1)], by_key, same);
    assert_eq!(all.len(), 1);
    assert!(actionable(all).is_empty());
}

#[test]
fn empty_current_means_everything_is_created() {
    let dev = vec![item("a", 1), item("b", 2)];
    let all = reconcile(&dev, &[], by_key, same);
    assert!(all.iter().all(|d| d.mark() == DiffMark::Create));
}

#[test]
fn duplicate_dev_keys_claim_current_once() {
    let dev = vec![item("a", 1), item("a", 1)];
    let all = reconcile(&dev, &[item("a", 1)], by_key, same);
    assert_eq!(all[0].mark(), DiffMark::None);
    assert_eq!(all[1].mark(), DiffMark::Create);
}

#[test]
fn out_of_range_finder_result_falls_back_to_create() {
    let all = reconcile(&[item("a", 1)], &[], |_, _| Some(7), same);
    assert_eq!(all[0].mark(), DiffMark::Create);
}
