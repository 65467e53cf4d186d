#![cfg(test)]

// Property tests for CounterTable kept inside the crate so they can check
// internal counters (tombstones) alongside the public behavior.

use crate::capacity::{self, MIN_CAPACITY};
use crate::counter_table::{CounterTable, Handle};
use core::hash::{BuildHasher, Hasher};
use proptest::prelude::*;
use std::collections::{BTreeSet, HashMap};

// Pool-indexed operations to improve shrinking: indices shrink to earlier keys,
// pool length shrinks, and op lists shrink in length.
#[derive(Clone, Debug)]
enum OpI {
    Insert(usize, i64),
    Delete(usize),
    Inc(usize),
    Dec(usize),
    Add(usize, i64),
    Get(usize),
    Contains(String),
    FlatView,
    Cursor,
}

fn arb_scenario() -> impl Strategy<Value = (Vec<String>, Vec<OpI>)> {
    proptest::collection::vec("[a-z]{0,5}", 1..=24).prop_flat_map(|pool| {
        let idxs: Vec<usize> = (0..pool.len()).collect();
        let idx = proptest::sample::select(idxs);
        let op = prop_oneof![
            (idx.clone(), any::<i64>()).prop_map(|(i, v)| OpI::Insert(i, v)),
            idx.clone().prop_map(OpI::Delete),
            idx.clone().prop_map(OpI::Inc),
            idx.clone().prop_map(OpI::Dec),
            (idx.clone(), -1000i64..1000).prop_map(|(i, d)| OpI::Add(i, d)),
            idx.clone().prop_map(OpI::Get),
            "[a-z]{0,5}".prop_map(OpI::Contains),
            Just(OpI::FlatView),
            Just(OpI::Cursor),
        ];
        proptest::collection::vec(op, 1..120).prop_map(move |ops| (pool.clone(), ops))
    })
}

// Runs one scenario against a std HashMap model. Invariants checked:
// - Values and presence match the model after every op; `len` equals the
//   number of distinct live keys.
// - A key keeps its handle while live; deleted handles never resolve again.
// - Capacity is a power of two >= 4, load stays <= 80 %, and at least one
//   slot is empty.
// - Flat view, `iter` and a cursor pass all yield the live key set once each,
//   in the same order; `reset` replays the cursor pass exactly.
fn run_scenario<S: BuildHasher>(
    mut sut: CounterTable<S>,
    pool: &[String],
    ops: Vec<OpI>,
) -> Result<(), TestCaseError> {
    let mut model: HashMap<String, i64> = HashMap::new();
    let mut live: HashMap<String, Handle> = HashMap::new();
    let mut stale: Vec<Handle> = Vec::new();

    for op in ops {
        match op {
            OpI::Insert(i, v) => {
                let k = &pool[i];
                let h = sut.insert(k, v);
                if let Some(&prev) = live.get(k) {
                    prop_assert_eq!(prev, h, "overwrite must keep the handle");
                }
                live.insert(k.clone(), h);
                model.insert(k.clone(), v);
            }
            OpI::Delete(i) => {
                let k = &pool[i];
                prop_assert_eq!(sut.delete(k), model.remove(k));
                if let Some(h) = live.remove(k) {
                    stale.push(h);
                }
                prop_assert!(sut.get(k).is_none());
            }
            OpI::Inc(i) | OpI::Dec(i) | OpI::Add(i, _) => {
                let k = &pool[i];
                let (h, d) = match op {
                    OpI::Inc(_) => (sut.inc(k), 1),
                    OpI::Dec(_) => (sut.dec(k), -1),
                    OpI::Add(_, d) => (sut.add(k, d), d),
                    _ => unreachable!(),
                };
                let mv = model.entry(k.clone()).or_insert(0);
                *mv = mv.wrapping_add(d);
                prop_assert_eq!(h.value(&sut), Some(*mv));
                prop_assert_eq!(h.key(&sut), Some(k.as_str()));
                live.insert(k.clone(), h);
            }
            OpI::Get(i) => {
                let k = &pool[i];
                let got = sut.get(k);
                prop_assert_eq!(got.map(|it| it.value()), model.get(k).copied());
                if let Some(it) = got {
                    prop_assert_eq!(live.get(k).copied(), Some(it.handle()));
                }
            }
            OpI::Contains(s) => {
                prop_assert_eq!(sut.contains_key(&s), model.contains_key(&s));
            }
            OpI::FlatView => {
                let view: Vec<String> = sut
                    .flat_view()
                    .iter()
                    .map(|it| it.key().to_string())
                    .collect();
                prop_assert_eq!(view.len(), sut.len());
                let set: BTreeSet<String> = view.iter().cloned().collect();
                let m_keys: BTreeSet<String> = model.keys().cloned().collect();
                prop_assert_eq!(set, m_keys);
                let via_iter: Vec<String> = sut.iter().map(|it| it.key().to_string()).collect();
                prop_assert_eq!(&via_iter, &view);
            }
            OpI::Cursor => {
                let flat = sut.flat_view();
                let mut c = sut.cursor();
                prop_assert_eq!(c.len(), sut.len());
                let mut first = Vec::new();
                while let Some(it) = c.current() {
                    first.push(it);
                    c.advance();
                }
                prop_assert_eq!(&first, &flat);
                c.reset();
                let mut second = Vec::new();
                while let Some(it) = c.current() {
                    second.push(it);
                    c.advance();
                }
                prop_assert_eq!(first, second);
            }
        }

        // Post-conditions after each op
        // 1) Deleted handles never resolve, even after the key is re-added
        for &h in &stale {
            prop_assert!(h.value(&sut).is_none());
        }
        // 2) Size, capacity and load parity
        prop_assert_eq!(sut.len(), model.len());
        prop_assert_eq!(sut.is_empty(), model.is_empty());
        let cap = sut.capacity();
        prop_assert!(cap.is_power_of_two() && cap >= MIN_CAPACITY);
        prop_assert!(!capacity::exceeds_max_load(sut.len(), cap));
        prop_assert!(sut.len() + sut.tombstones() < cap);
        prop_assert_eq!(sut.iter().count(), sut.len());
    }
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine((pool, ops) in arb_scenario()) {
        run_scenario(CounterTable::new(), &pool, ops)?;
    }

    #[test]
    fn prop_state_machine_presized((pool, ops) in arb_scenario(), cap in 0usize..300) {
        run_scenario(CounterTable::with_capacity(cap), &pool, ops)?;
    }
}

// Collision variant using a constant hasher to stress probing and
// tombstone handling on a single chain.
#[derive(Clone, Default)]
struct ConstBuildHasher;
struct ConstHasher;
impl BuildHasher for ConstBuildHasher {
    type Hasher = ConstHasher;
    fn build_hasher(&self) -> Self::Hasher {
        ConstHasher
    }
}
impl Hasher for ConstHasher {
    fn write(&mut self, _bytes: &[u8]) {}
    fn finish(&self) -> u64 {
        0
    }
}

// Property: same state-machine invariants as above, under worst-case
// collision behavior (constant hasher).
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine_with_collisions((pool, ops) in arb_scenario()) {
        let sut = CounterTable::with_capacity_and_hasher(4, ConstBuildHasher);
        run_scenario(sut, &pool, ops)?;
    }
}
