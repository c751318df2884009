use pretty_assertions::assert_eq;

use super::*;

fn unit(code: &mut ReverseCode, groups: &[&[u8]]) -> bool {
    let mut collect = ReverseCollect::default();
    for g in groups {
        collect.record(g);
    }
    let made = code.make_unit(&mut collect);
    assert!(collect.is_empty());
    made
}

#[test]
fn empty_collection_makes_no_unit() {
    let mut code = ReverseCode::new();
    assert!(!unit(&mut code, &[]));
    assert!(code.is_empty());
    assert_eq!(code.byte_len(), 0);
    assert!(code.pop_unit().is_none());
}

#[test]
fn groups_replay_newest_first() {
    let mut code = ReverseCode::new();
    assert!(unit(&mut code, &[b"first", b"second", b""]));
    let popped = code.pop_unit().unwrap();
    let groups: Vec<&[u8]> = popped.groups().collect();
    assert_eq!(groups, vec![&b""[..], &b"second"[..], &b"first"[..]]);
    assert_eq!(code.byte_len(), 0);
}

#[test]
fn units_pop_in_reverse_creation_order() {
    let mut code = ReverseCode::new();
    unit(&mut code, &[b"a"]);
    unit(&mut code, &[b"b1", b"b2"]);
    unit(&mut code, &[b"c"]);
    assert_eq!(code.len(), 3);
    let order: Vec<Vec<Vec<u8>>> = std::iter::from_fn(|| code.pop_unit())
        .map(|u| u.groups().map(<[u8]>::to_vec).collect())
        .collect();
    assert_eq!(
        order,
        vec![
            vec![b"c".to_vec()],
            vec![b"b2".to_vec(), b"b1".to_vec()],
            vec![b"a".to_vec()],
        ]
    );
    assert!(code.is_empty());
}

#[test]
fn clear_drops_everything() {
    let mut code = ReverseCode::new();
    unit(&mut code, &[b"x"]);
    code.clear();
    assert!(code.pop_unit().is_none());
}
