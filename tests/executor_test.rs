//! End-to-end operator tree tests: scan, filter, aggregate, and the
//! one-shot side-effecting operators over real heap-file storage.

use std::sync::Arc;

use heapdb::{
    Aggregate, AggregateOp, Database, DbIterator, Delete, Field, FieldType, Filter, HeapFile,
    Insert, Op, Predicate, SeqScan, TransactionId, Tuple, TupleDesc, TupleIterator,
};
use tempfile::{tempdir, TempDir};

fn group_value_desc() -> Arc<TupleDesc> {
    Arc::new(TupleDesc::new([
        (FieldType::Int, Some("g".to_string())),
        (FieldType::Int, Some("v".to_string())),
    ]))
}

struct Fixture {
    db: Database,
    table_id: u32,
    desc: Arc<TupleDesc>,
    _dir: TempDir,
}

fn fixture_with_rows(rows: &[(i32, i32)]) -> Fixture {
    let dir = tempdir().unwrap();
    let desc = group_value_desc();
    let file = Arc::new(HeapFile::create(dir.path().join("t.dat"), desc.clone()).unwrap());
    let db = Database::with_pool_size(8);
    let table_id = db.catalog().add_table(file, "t");

    let tid = TransactionId::new();
    for &(g, v) in rows {
        db.buffer_pool()
            .insert_tuple(
                tid,
                table_id,
                Tuple::new(desc.clone(), vec![Field::Int(g), Field::Int(v)]),
            )
            .unwrap();
    }
    Fixture {
        db,
        table_id,
        desc,
        _dir: dir,
    }
}

fn scan(f: &Fixture, tid: TransactionId) -> SeqScan {
    SeqScan::new(
        f.db.catalog().clone(),
        f.db.buffer_pool().clone(),
        tid,
        f.table_id,
        Some("t"),
    )
    .unwrap()
}

fn drain_pairs(it: &mut dyn DbIterator) -> Vec<(i32, i32)> {
    let mut out = Vec::new();
    while let Some(t) = it.next().unwrap() {
        match (t.field(0), t.field(1)) {
            (Field::Int(a), Field::Int(b)) => out.push((*a, *b)),
            _ => unreachable!(),
        }
    }
    out
}

#[test]
fn filter_over_scan() {
    let f = fixture_with_rows(&[(1, 10), (2, 20), (3, 30), (4, 40)]);
    let tid = TransactionId::new();

    // SELECT * FROM t WHERE v >= 30
    let mut filter = Filter::new(
        Predicate::new(1, Op::GreaterThanOrEq, Field::Int(30)),
        Box::new(scan(&f, tid)),
    );
    filter.open().unwrap();
    assert_eq!(drain_pairs(&mut filter), vec![(3, 30), (4, 40)]);
    filter.close();
}

#[test]
fn aggregate_over_scan_matches_expected_groups() {
    let f = fixture_with_rows(&[(1, 10), (1, 20), (2, 5)]);
    let tid = TransactionId::new();

    // SELECT g, SUM(v) FROM t GROUP BY g
    let mut sum = Aggregate::new(Box::new(scan(&f, tid)), 1, Some(0), AggregateOp::Sum);
    sum.open().unwrap();
    let mut rows = drain_pairs(&mut sum);
    rows.sort_unstable();
    assert_eq!(rows, vec![(1, 30), (2, 5)]);
    sum.close();

    // SELECT g, AVG(v) FROM t GROUP BY g
    let mut avg = Aggregate::new(Box::new(scan(&f, tid)), 1, Some(0), AggregateOp::Avg);
    avg.open().unwrap();
    let mut rows = drain_pairs(&mut avg);
    rows.sort_unstable();
    assert_eq!(rows, vec![(1, 15), (2, 5)]);
    avg.close();

    // SELECT COUNT(v) FROM t
    let mut count = Aggregate::new(Box::new(scan(&f, tid)), 1, None, AggregateOp::Count);
    count.open().unwrap();
    let only = count.next().unwrap().unwrap();
    assert_eq!(only.field(0), &Field::Int(3));
    assert!(count.next().unwrap().is_none());
    count.close();
}

#[test]
fn insert_operator_is_one_shot() {
    let f = fixture_with_rows(&[]);
    let tid = TransactionId::new();

    let rows = vec![
        Tuple::new(f.desc.clone(), vec![Field::Int(1), Field::Int(2)]),
        Tuple::new(f.desc.clone(), vec![Field::Int(3), Field::Int(4)]),
    ];
    let child = Box::new(TupleIterator::new(f.desc.clone(), rows));
    let mut insert = Insert::new(f.db.buffer_pool().clone(), tid, child, f.table_id).unwrap();

    insert.open().unwrap();
    let count = insert.next().unwrap().unwrap();
    assert_eq!(count.field(0), &Field::Int(2));

    // Second fetch: end-of-stream, no second count, no repeated insert.
    assert!(insert.next().unwrap().is_none());
    insert.close();

    let mut check = scan(&f, tid);
    check.open().unwrap();
    assert_eq!(drain_pairs(&mut check), vec![(1, 2), (3, 4)]);
    check.close();
}

#[test]
fn insert_then_delete_roundtrip() {
    let f = fixture_with_rows(&[(1, 10), (2, 20), (3, 30)]);
    let tid = TransactionId::new();

    // DELETE FROM t WHERE g <> 2
    let filtered = Filter::new(
        Predicate::new(0, Op::NotEquals, Field::Int(2)),
        Box::new(scan(&f, tid)),
    );
    let mut delete = Delete::new(f.db.buffer_pool().clone(), tid, Box::new(filtered));
    delete.open().unwrap();
    assert_eq!(delete.next().unwrap().unwrap().field(0), &Field::Int(2));
    delete.close();

    let mut check = scan(&f, tid);
    check.open().unwrap();
    assert_eq!(drain_pairs(&mut check), vec![(2, 20)]);
    check.close();
}

#[test]
fn rewind_reproduces_identical_sequence() {
    let f = fixture_with_rows(&[(5, 50), (6, 60), (7, 70), (8, 80)]);
    let tid = TransactionId::new();

    let mut filter = Filter::new(
        Predicate::new(0, Op::GreaterThan, Field::Int(5)),
        Box::new(scan(&f, tid)),
    );
    filter.open().unwrap();

    let first = drain_pairs(&mut filter);
    for _ in 0..3 {
        filter.rewind().unwrap();
        assert_eq!(drain_pairs(&mut filter), first);
    }
    filter.close();
    assert_eq!(first, vec![(6, 60), (7, 70), (8, 80)]);
}

#[test]
fn aggregate_rewind_does_not_redrain_child() {
    let f = fixture_with_rows(&[(1, 1), (1, 2), (2, 3)]);
    let tid = TransactionId::new();

    let mut agg = Aggregate::new(Box::new(scan(&f, tid)), 1, Some(0), AggregateOp::Sum);
    agg.open().unwrap();
    let mut first = drain_pairs(&mut agg);
    first.sort_unstable();

    // Mutate the underlying table between rewinds; the materialized
    // aggregate results must replay unchanged.
    f.db.buffer_pool()
        .insert_tuple(
            tid,
            f.table_id,
            Tuple::new(f.desc.clone(), vec![Field::Int(1), Field::Int(100)]),
        )
        .unwrap();

    agg.rewind().unwrap();
    let mut second = drain_pairs(&mut agg);
    second.sort_unstable();
    agg.close();

    assert_eq!(first, second);
    assert_eq!(first, vec![(1, 3), (2, 3)]);
}

#[test]
fn scan_field_names_qualified_by_alias() {
    let f = fixture_with_rows(&[(1, 1)]);
    let tid = TransactionId::new();

    let s = scan(&f, tid);
    assert_eq!(s.tuple_desc().field_name(0), Some("t.g"));
    assert_eq!(s.tuple_desc().field_name(1), Some("t.v"));

    let unaliased = SeqScan::new(
        f.db.catalog().clone(),
        f.db.buffer_pool().clone(),
        tid,
        f.table_id,
        None,
    )
    .unwrap();
    assert_eq!(unaliased.tuple_desc().field_name(0), Some("null.g"));
}

#[test]
fn early_close_is_safe_mid_stream() {
    let f = fixture_with_rows(&[(1, 1), (2, 2), (3, 3)]);
    let tid = TransactionId::new();

    let mut s = scan(&f, tid);
    s.open().unwrap();
    assert!(s.next().unwrap().is_some());
    s.close(); // mid-stream
    s.close(); // and again

    // Reopening replays from the start.
    s.open().unwrap();
    assert_eq!(drain_pairs(&mut s).len(), 3);
    s.close();
}
