/// Enemy pursuit: direct chase, A* path following and melee attacks.

mod pursuit;


pub use pursuit::{EnemyBehavior, EnemyUpdate, MeleeHit, PlayerView, PursuitConfig, PursuitContext};
