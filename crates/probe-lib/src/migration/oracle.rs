//! Page-location lookups

use crate::models::PageLocation;
use crate::numa::NumaSystem;
use tracing::trace;

/// Node currently backing the page that contains `addr`
///
/// A failed lookup yields `PageLocation::Unknown`, which callers must
/// exclude rather than count as any node.
pub fn locate<S: NumaSystem + ?Sized>(system: &S, addr: usize) -> PageLocation {
    match system.query_page_node(addr) {
        Ok(node) => PageLocation::Node(node),
        Err(e) => {
            trace!(addr = format_args!("{:#x}", addr), error = %e, "Page location unknown");
            PageLocation::Unknown
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NodeId;
    use crate::numa::SimulatedNuma;

    #[test]
    fn test_locate_known_page() {
        let system = SimulatedNuma::new(2).with_first_touch_node(NodeId(1));
        assert_eq!(locate(&system, 0x10_0000), PageLocation::Node(NodeId(1)));
    }

    #[test]
    fn test_locate_failure_is_unknown() {
        let system = SimulatedNuma::new(2);
        system.fail_lookups_at(0x20_0000);

        assert_eq!(locate(&system, 0x20_0008), PageLocation::Unknown);
        assert_eq!(locate(&system, 0x20_1000), PageLocation::Node(NodeId(0)));
    }
}
