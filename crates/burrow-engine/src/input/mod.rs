//! Input components: the player controller and the simple enemy AI.
//!
//! Both variants turn something (held keys, or a periodic decision) into
//! calls on the owner's [`PhysicsComponent`](crate::physics::PhysicsComponent).
//! They run after physics, so what they queue is integrated next frame.

mod ai;
mod player;
mod state;

pub use ai::SimpleAi;
pub use player::PlayerController;
pub use state::{InputSnapshot, InputState, Key, MouseButton};

use burrow_ecs::component::{Component, ComponentKind};
use burrow_ecs::entity::EntityId;
use burrow_ecs::system::ComponentSystem;
use burrow_ecs::EcsError;
use rand_pcg::Pcg32;

use crate::collider::ColliderSystem;
use crate::command::CommandQueue;
use crate::config::{AiTuning, PlayerTuning};
use crate::entity::Entities;
use crate::events::EventBus;
use crate::inventory::Inventory;
use crate::physics::PhysicsSystem;
use crate::tilemap::Tilemap;

/// What an input step may touch.
pub struct InputContext<'a> {
    pub entities: &'a Entities,
    pub physics: &'a mut PhysicsSystem,
    pub colliders: &'a ColliderSystem,
    pub tilemap: &'a mut Tilemap,
    pub inventory: &'a mut Inventory,
    pub input: &'a dyn InputState,
    pub events: &'a mut EventBus,
    pub commands: &'a mut CommandQueue,
    pub rng: &'a mut Pcg32,
    /// The entity enemies chase.
    pub player: Option<EntityId>,
    pub player_tuning: &'a PlayerTuning,
    pub ai_tuning: &'a AiTuning,
    pub dt: f64,
}

#[derive(Debug, Clone)]
pub enum Controller {
    Player(PlayerController),
    SimpleAi(SimpleAi),
}

#[derive(Debug, Clone)]
pub struct InputComponent {
    owner: EntityId,
    alive: bool,
    pub controller: Controller,
}

impl InputComponent {
    pub fn new(owner: EntityId, controller: Controller) -> Self {
        Self {
            owner,
            alive: true,
            controller,
        }
    }

    pub fn player(owner: EntityId, tuning: &PlayerTuning) -> Self {
        Self::new(owner, Controller::Player(PlayerController::new(tuning)))
    }

    pub fn simple_ai(owner: EntityId, tuning: &AiTuning, rng: &mut Pcg32) -> Self {
        Self::new(owner, Controller::SimpleAi(SimpleAi::new(tuning, rng)))
    }

    fn update(&mut self, ctx: &mut InputContext<'_>) -> bool {
        if !ctx.entities.is_alive(self.owner) {
            tracing::warn!(entity = %self.owner, "input owner missing, dropping controller");
            return false;
        }
        match &mut self.controller {
            Controller::Player(player) => player.update(self.owner, ctx),
            Controller::SimpleAi(ai) => ai.update(self.owner, ctx),
        }
        true
    }
}

impl Component for InputComponent {
    const KIND: ComponentKind = ComponentKind::Input;

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

#[derive(Debug, Default)]
pub struct InputSystem {
    controllers: ComponentSystem<InputComponent>,
}

impl InputSystem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, component: InputComponent) -> Result<(), EcsError> {
        self.controllers.insert(component)
    }

    pub fn get(&self, owner: EntityId) -> Option<&InputComponent> {
        self.controllers.get(owner)
    }

    pub fn get_mut(&mut self, owner: EntityId) -> Option<&mut InputComponent> {
        self.controllers.get_mut(owner)
    }

    pub fn kill(&mut self, owner: EntityId) -> bool {
        self.controllers.kill(owner)
    }

    pub fn len(&self) -> usize {
        self.controllers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.controllers.is_empty()
    }

    pub fn update(&mut self, ctx: &mut InputContext<'_>) -> usize {
        self.controllers.run(|component| component.update(ctx))
    }
}
