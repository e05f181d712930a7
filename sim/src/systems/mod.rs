//! ECS systems for the beaker simulation.
//!
//! Systems contain the per-tick logic that operates on particle components
//! and the simulation resources.
//!
//! ## Frame Order
//!
//! One fixed tick runs every system exactly once, chained in this order so
//! each step sees what the previous one wrote:
//!
//! 1. `deferred_dispatch_system` - fires staggered spawns that came due
//! 2. `liquid_update_system` - surface channels, fill level, color, opacity
//! 3. `bubble_update_system`
//! 4. `splash_update_system`
//! 5. `precipitate_update_system`
//! 6. `foam_update_system`
//! 7. `pour_stream_system` - reads the level written in step 2
//! 8. `stir_system`

pub mod bubble;
pub mod clock;
pub mod deferred;
pub mod foam;
pub mod lifecycle;
pub mod liquid;
pub mod pour;
pub mod precipitate;
pub mod serialization;
pub mod splash;
pub mod stir;

pub use bubble::*;
pub use clock::*;
pub use deferred::*;
pub use foam::*;
pub use lifecycle::*;
pub use liquid::*;
pub use pour::*;
pub use precipitate::*;
pub use serialization::*;
pub use splash::*;
pub use stir::*;
