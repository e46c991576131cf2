//! Property tests for component system bookkeeping.
//!
//! Random sequences of spawn / kill / despawn / sweep operations are applied
//! to an allocator plus one component system, and the system's lookup table
//! is checked against a simple model after every step.

use burrow_ecs::prelude::*;
use proptest::prelude::*;

#[derive(Debug)]
struct Marker {
    owner: EntityId,
    alive: bool,
    value: u32,
}

impl Component for Marker {
    const KIND: ComponentKind = ComponentKind::Collider;

    fn owner(&self) -> EntityId {
        self.owner
    }

    fn is_alive(&self) -> bool {
        self.alive
    }

    fn kill(&mut self) {
        self.alive = false;
    }
}

#[derive(Debug, Clone)]
enum Op {
    Spawn(u32),
    Kill(usize),
    Despawn(usize),
    Sweep,
    Run,
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0..1000u32).prop_map(Op::Spawn),
        (0..64usize).prop_map(Op::Kill),
        (0..64usize).prop_map(Op::Despawn),
        Just(Op::Sweep),
        Just(Op::Run),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(2_000))]

    #[test]
    fn random_ops_keep_lookup_consistent(ops in prop::collection::vec(op_strategy(), 1..60)) {
        let mut alloc = EntityAllocator::new();
        let mut system: ComponentSystem<Marker> = ComponentSystem::new();
        // (entity, expected value, component alive)
        let mut model: Vec<(EntityId, u32, bool)> = Vec::new();

        for op in ops {
            match op {
                Op::Spawn(value) => {
                    let e = alloc.allocate();
                    system.insert(Marker { owner: e, alive: true, value }).unwrap();
                    model.push((e, value, true));
                }
                Op::Kill(i) => {
                    if !model.is_empty() {
                        let i = i % model.len();
                        system.kill(model[i].0);
                        model[i].2 = false;
                    }
                }
                Op::Despawn(i) => {
                    if !model.is_empty() {
                        let i = i % model.len();
                        let (e, _, _) = model.remove(i);
                        system.kill(e);
                        prop_assert!(alloc.deallocate(e));
                    }
                }
                Op::Sweep => {
                    system.sweep();
                }
                Op::Run => {
                    system.run(|m| {
                        m.value += 1;
                        true
                    });
                    for entry in model.iter_mut().filter(|entry| entry.2) {
                        entry.1 += 1;
                    }
                }
            }

            // Invariant: every live model entry resolves to its own component.
            for &(e, value, alive) in &model {
                if alive {
                    let found = system.get(e);
                    prop_assert!(found.is_some());
                    let found = found.unwrap();
                    prop_assert_eq!(found.owner, e);
                    prop_assert_eq!(found.value, value);
                } else {
                    prop_assert!(!system.contains(e));
                }
            }

            // Invariant: live count matches the model.
            let expected_live = model.iter().filter(|entry| entry.2).count();
            prop_assert_eq!(system.live_count(), expected_live);
            prop_assert_eq!(alloc.alive_count(), model.len());
        }
    }

    /// After a sweep only live components remain, in registration order.
    #[test]
    fn sweep_keeps_registration_order(kill_mask in prop::collection::vec(any::<bool>(), 1..40)) {
        let mut alloc = EntityAllocator::new();
        let mut system: ComponentSystem<Marker> = ComponentSystem::new();
        let ids: Vec<EntityId> = kill_mask.iter().map(|_| alloc.allocate()).collect();
        for (i, &e) in ids.iter().enumerate() {
            system.insert(Marker { owner: e, alive: true, value: i as u32 }).unwrap();
        }
        for (&e, &kill) in ids.iter().zip(&kill_mask) {
            if kill {
                system.kill(e);
            }
        }
        system.sweep();

        let survivors: Vec<EntityId> = ids
            .iter()
            .zip(&kill_mask)
            .filter(|&(_, &kill)| !kill)
            .map(|(&e, _)| e)
            .collect();
        let stored: Vec<EntityId> = system.iter().map(|m| m.owner).collect();
        prop_assert_eq!(stored, survivors);
    }
}
