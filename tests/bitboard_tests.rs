use battleship_link::{BitBoard, BitBoardError};

#[test]
fn test_get_set_clear() {
    let mut bb = BitBoard::<u16, 4>::new();
    assert!(bb.is_empty());

    bb.set(1, 1).unwrap();
    assert!(bb.get(1, 1).unwrap());
    assert_eq!(bb.count_ones(), 1);

    bb.clear(1, 1).unwrap();
    assert!(!bb.get(1, 1).unwrap());
    assert!(bb.is_empty());
}

#[test]
fn test_out_of_bounds() {
    let mut bb = BitBoard::<u128, 10>::new();
    assert_eq!(
        bb.set(10, 0),
        Err(BitBoardError::IndexOutOfBounds { row: 10, col: 0 })
    );
    assert!(bb.get(0, 10).is_err());
    assert!(!bb.contains(42, 42));
}

#[test]
fn test_iter_ones_row_major() {
    let mut bb = BitBoard::<u16, 4>::new();
    bb.set(3, 3).unwrap();
    bb.set(0, 1).unwrap();
    let bits: Vec<_> = bb.iter_ones().collect();
    assert_eq!(bits, vec![(0, 1), (3, 3)]);
}

#[test]
fn test_bit_ops() {
    let mut a = BitBoard::<u128, 10>::new();
    let mut b = BitBoard::<u128, 10>::new();
    a.set(2, 2).unwrap();
    a.set(5, 5).unwrap();
    b.set(5, 5).unwrap();
    assert_eq!((a & b).count_ones(), 1);
    assert_eq!((a | b).count_ones(), 2);
    assert_eq!((!a).count_ones(), 98);
}
