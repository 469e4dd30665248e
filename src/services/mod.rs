pub mod change_source;
pub mod classifier;
pub mod collector;
pub mod overlay;
pub mod rasterizer;
pub mod region_sink;
pub mod scheduler;
pub mod signature;
pub mod sync_engine;

pub use change_source::create_change_sources;
pub use overlay::start;
pub use region_sink::create_region_sink;
pub use scheduler::create_frame_clock;
pub use classifier::HitTargetClassifier;
pub use collector::RegionCollector;
pub use rasterizer::rasterize;
pub use region_sink::NativeRegionSink;
pub use signature::RegionSignature;
