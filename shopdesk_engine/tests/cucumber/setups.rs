use cucumber::given;
use shopdesk_engine::TransitionPolicy;

use crate::cucumber::{shop_world::ShopSystem, ShopWorld};

#[given("a fresh install")]
async fn fresh_database(world: &mut ShopWorld) {
    world.system = Some(ShopSystem::new(TransitionPolicy::default()).await);
}

#[given("a fresh install that allows paid orders to be cancelled")]
async fn fresh_lenient_database(world: &mut ShopWorld) {
    world.system = Some(ShopSystem::new(TransitionPolicy::new(true)).await);
}
