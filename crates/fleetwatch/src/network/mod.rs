pub mod checker;
pub mod icmp;

pub use checker::{EchoError, EchoProber, NetworkHostResult, ReachabilityChecker};
pub use icmp::IcmpEchoProber;
