use cipherforge::alphabet::Alphabet;
use cipherforge::mapping::Mapping;
use cipherforge::permutation::ordinal_to_permutation;
use cipherforge::ALPHABET_SIZE;

#[test]
fn one_hot_input_selects_the_permuted_target() {
    let perm = ordinal_to_permutation(123_456_789_012);
    let mapping = Mapping::from_permutation(&perm);

    for (i, &target) in perm.iter().enumerate() {
        assert_eq!(mapping.apply(1 << i), 1 << target, "source {}", i);

        let mut vector = [0u8; ALPHABET_SIZE];
        vector[i] = 1;
        let out = mapping.apply_vector(&vector);
        for (j, &bit) in out.iter().enumerate() {
            assert_eq!(bit == 1, j == target as usize);
        }
    }
}

#[test]
fn identity_leaves_masks_unchanged() {
    let identity = Mapping::identity();
    for mask in [0u32, 1, 0b1011, (1 << 27) - 1] {
        assert_eq!(identity.apply(mask), mask);
    }
    assert!(identity.is_bijection());
    assert_eq!(Mapping::from_permutation(&ordinal_to_permutation(0)), identity);
}

#[test]
fn empty_mapping_sends_everything_to_zero() {
    let empty = Mapping::new();
    assert_eq!(empty.apply((1 << 27) - 1), 0);
    assert!(!empty.is_bijection());
}

#[test]
fn set_mapping_builds_relations_and_ignores_out_of_range() {
    let mut m = Mapping::new();
    m.set_mapping(0, 5);
    m.set_mapping(0, 6);
    m.set_mapping(27, 0);
    m.set_mapping(0, 40);

    assert!(m.get(0, 5));
    assert!(m.get(0, 6));
    assert!(!m.get(1, 5));
    assert!(!m.get(27, 0));
    assert_eq!(m.apply(1), (1 << 5) | (1 << 6));
    assert!(!m.is_bijection());
}

#[test]
fn columns_are_the_transpose() {
    let perm = ordinal_to_permutation(987_654_321);
    let mapping = Mapping::from_permutation(&perm);
    let cols = mapping.columns();
    for (i, &target) in perm.iter().enumerate() {
        assert_eq!(cols[target as usize], 1 << i);
    }
}

#[test]
fn visualization_lists_source_over_target() {
    let source = Alphabet::source();
    let target = Alphabet::from_symbols("xyabcdefghijklmnopqrstuvwz ").unwrap();
    let text = Mapping::identity().visualize(&source, &target);

    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with("SRC: a b c"));
    assert!(lines[1].starts_with("TGT: x y a"));
}

#[test]
fn visualization_marks_unmapped_rows() {
    let alpha = Alphabet::source();
    let mut m = Mapping::new();
    m.set_mapping(0, 1);
    let text = m.visualize(&alpha, &alpha);
    assert!(text.lines().nth(1).unwrap().starts_with("TGT: b ? ?"));
}
