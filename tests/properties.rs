//! Whole-manager properties: canonicity, correctness against truth tables,
//! collection safety, cache transparency and failure recovery.

use std::collections::HashMap;

use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use test_log::test;

use bdd_mgr::{parse_expr, Bdd, BddMgr, Expr, MgrConfig, VarId};

/// A random expression over `nvars` variables.
fn random_expr(rng: &mut ChaCha8Rng, nvars: u32, depth: u32) -> Expr {
    if depth == 0 || rng.random_bool(0.25) {
        return Expr::literal(VarId::new(rng.random_range(0..nvars)), rng.random_bool(0.5));
    }
    let lhs = random_expr(rng, nvars, depth - 1);
    let rhs = random_expr(rng, nvars, depth - 1);
    match rng.random_range(0..4) {
        0 => Expr::and(lhs, rhs),
        1 => Expr::or(lhs, rhs),
        2 => Expr::xor(lhs, rhs),
        _ => Expr::not(Expr::and(lhs, rhs)),
    }
}

fn expr_table(e: &Expr, vars: &[VarId]) -> Vec<bool> {
    let n = vars.len();
    (0..1usize << n)
        .map(|p| {
            e.eval(&|v: VarId| {
                let i = vars.iter().position(|&w| w == v).unwrap();
                (p >> (n - 1 - i)) & 1 != 0
            })
        })
        .collect()
}

fn vars(n: u32) -> Vec<VarId> {
    (0..n).map(VarId::new).collect()
}

#[test]
fn test_apply_matches_truth_tables() {
    let mut rng = ChaCha8Rng::seed_from_u64(0x9e37_79b9_7f4a_7c15);
    for n in [1, 3, 6, 9, 12] {
        let mgr = BddMgr::default();
        let v = vars(n);
        for _ in 0..8 {
            let e = random_expr(&mut rng, n, 6);
            let f = mgr.expr_to_bdd(&e, None);
            assert_eq!(f.to_truth_table(&v).unwrap(), expr_table(&e, &v), "{}", e);
        }
    }
}

#[test]
fn test_canonicity() {
    let mut rng = ChaCha8Rng::seed_from_u64(42);
    let mgr = BddMgr::default();
    let v = vars(8);
    for _ in 0..20 {
        let e = random_expr(&mut rng, 8, 5);
        let f = mgr.expr_to_bdd(&e, None);
        // Same function through a truth table and through its complement.
        let table = f.to_truth_table(&v).unwrap();
        assert_eq!(mgr.tvec_to_bdd(&table, &v), f);
        let g = mgr.expr_to_bdd(&Expr::not(Expr::not(e.clone())), None);
        assert_eq!(g.edge(), f.edge());
        let h = !mgr.expr_to_bdd(&Expr::Not(Box::new(e)), None);
        assert_eq!(h.edge(), f.edge());
    }
}

#[test]
fn test_complement_involution() {
    let mgr = BddMgr::default();
    let f = mgr.expr_to_bdd(&parse_expr("x0 & (x1 | ~x2) ^ x3").unwrap(), None);
    let g = !&f;
    assert_ne!(g, f);
    assert_eq!(!&g, f);
    assert!((&f & &g).is_zero());
    assert!((&f | &g).is_one());
}

#[test]
fn test_gc_safety() {
    let mut rng = ChaCha8Rng::seed_from_u64(7);
    let mgr = BddMgr::default();
    let v = vars(10);
    let kept: Vec<Bdd<'_>> = (0..10)
        .map(|_| mgr.expr_to_bdd(&random_expr(&mut rng, 10, 6), None))
        .collect();
    let tables: Vec<_> = kept.iter().map(|f| f.to_truth_table(&v).unwrap()).collect();

    for _ in 0..50 {
        let _garbage = mgr.expr_to_bdd(&random_expr(&mut rng, 10, 6), None);
    }
    assert!(mgr.garbage_num() > 0);
    mgr.gc(true);
    assert_eq!(mgr.garbage_num(), 0);

    for (f, table) in kept.iter().zip(&tables) {
        assert_eq!(&f.to_truth_table(&v).unwrap(), table);
    }
    // New nodes reuse freed slots and stay canonical.
    let rebuilt: Vec<_> = tables.iter().map(|t| mgr.tvec_to_bdd(t, &v)).collect();
    assert_eq!(rebuilt, kept);
}

#[test]
fn test_cache_transparency() {
    let mut rng = ChaCha8Rng::seed_from_u64(1234);
    let mgr = BddMgr::default();
    let exprs: Vec<_> = (0..10).map(|_| random_expr(&mut rng, 8, 6)).collect();
    let cached: Vec<_> = exprs.iter().map(|e| mgr.expr_to_bdd(e, None)).collect();
    let fresh: Vec<_> = exprs
        .iter()
        .map(|e| {
            mgr.clear_cache();
            mgr.expr_to_bdd(e, None)
        })
        .collect();
    assert_eq!(cached, fresh);

    // Without clearing, rebuilding is answered from the caches.
    let again: Vec<_> = exprs.iter().map(|e| mgr.expr_to_bdd(e, None)).collect();
    assert_eq!(again, cached);
    assert!(mgr.cache_stats().hits > 0);
}

#[test]
fn test_overflow_is_reported_and_recoverable() {
    let small = BddMgr::new(MgrConfig::default().with_max_nodes(64));
    let f = small.make_thfunc(24, 12);
    assert!(f.is_overflow());
    // Overflow absorbs further operations.
    let x = small.make_posiliteral(VarId::new(0));
    assert!((&f & &x).is_overflow());
    assert!((&f & &small.make_error()).is_error());
    drop(f);

    // Small functions still fit after a collection.
    small.gc(false);
    assert!(!small.make_thfunc(6, 3).is_invalid());

    // A larger manager builds the function.
    let big = BddMgr::new(MgrConfig::default().with_max_nodes(1 << 16));
    let g = big.make_thfunc(24, 12);
    assert!(!g.is_invalid());
    assert_eq!(g.support().len(), 24);
}

#[test]
fn test_overflow_retry_after_gc() {
    let mgr = BddMgr::new(MgrConfig::default().with_max_nodes(40).with_gc_node_limit(1 << 20));
    let x: Vec<_> = (0..8).map(|i| mgr.make_posiliteral(VarId::new(i))).collect();
    {
        let _garbage = mgr.make_thfunc(8, 4);
    }
    // The table is nearly full of garbage; the operation collects and retries.
    let f = mgr.xor_all(&x);
    assert!(!f.is_invalid());
    assert!(mgr.gc_count() >= 1);
}

#[test]
fn test_thfunc_and_onepath() {
    let mgr = BddMgr::default();
    let f = mgr.make_thfunc(3, 2);
    assert_eq!(f.eval(|v| v.id() != 2), Some(true));
    assert_eq!(f.eval(|v| v.id() == 0), Some(false));

    let p = f.onepath();
    assert!(p.implies(&f));
    assert!(!p.is_zero());
    let s = f.shortest_onepath();
    assert!(s.implies(&f));
    assert_eq!(f.shortest_onepath_len(), Some(2));
}

#[test]
fn test_truth_table_dump_restore() {
    let mut rng = ChaCha8Rng::seed_from_u64(99);
    let mgr = BddMgr::default();
    let other = BddMgr::default();
    for _ in 0..5 {
        let f = mgr.expr_to_bdd(&random_expr(&mut rng, 7, 5), None);
        let mut buf = Vec::new();
        f.dump_truth_table(&mut buf).unwrap();
        assert_eq!(mgr.restore_truth_table(buf.as_slice()).unwrap(), f);

        let g = other.restore_truth_table(buf.as_slice()).unwrap();
        let support = f.support();
        assert_eq!(g.to_truth_table(&support), f.to_truth_table(&support));
    }
}

#[test]
fn test_compose_matches_substitution() {
    let mgr = BddMgr::default();
    let e = parse_expr("x0 & x1 | x2 ^ x3").unwrap();
    let f = mgr.expr_to_bdd(&e, None);

    let g0 = mgr.expr_to_bdd(&parse_expr("x4 | x5").unwrap(), None);
    let g2 = mgr.expr_to_bdd(&parse_expr("x0 & x4").unwrap(), None);
    let composed = f.compose(&[(VarId::new(0), &g0), (VarId::new(2), &g2)]);

    let mut map = HashMap::new();
    map.insert(VarId::new(0), g0.clone());
    map.insert(VarId::new(2), g2.clone());
    assert_eq!(composed, mgr.expr_to_bdd(&e, Some(&map)));
}
