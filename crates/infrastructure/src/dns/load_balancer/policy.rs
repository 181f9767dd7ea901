use ferrous_doh_domain::UpstreamPolicy;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Decides the order in which upstreams are tried for one query.
///
/// `list(n)` is always a permutation of `0..n`; `list(0)` is empty.
pub trait SelectionPolicy: Send + Sync {
    fn list(&self, pool_size: usize) -> Vec<usize>;

    fn name(&self) -> &'static str;
}

/// Fresh uniform shuffle on every call.
#[derive(Debug, Default)]
pub struct RandomPolicy;

impl RandomPolicy {
    pub fn new() -> Self {
        Self
    }
}

impl SelectionPolicy for RandomPolicy {
    fn list(&self, pool_size: usize) -> Vec<usize> {
        let mut order: Vec<usize> = (0..pool_size).collect();
        fastrand::shuffle(&mut order);
        order
    }

    fn name(&self) -> &'static str {
        "random"
    }
}

/// Rotates the starting upstream by one on every call.
#[derive(Debug, Default)]
pub struct RoundRobinPolicy {
    cursor: AtomicUsize,
}

impl RoundRobinPolicy {
    pub fn new() -> Self {
        Self {
            cursor: AtomicUsize::new(0),
        }
    }

    fn next_start(&self, pool_size: usize) -> usize {
        // fetch_add wraps at usize::MAX, which only skews one rotation
        self.cursor.fetch_add(1, Ordering::Relaxed).wrapping_add(1) % pool_size
    }
}

impl SelectionPolicy for RoundRobinPolicy {
    fn list(&self, pool_size: usize) -> Vec<usize> {
        if pool_size == 0 {
            return Vec::new();
        }
        let start = self.next_start(pool_size);
        (start..pool_size).chain(0..start).collect()
    }

    fn name(&self) -> &'static str {
        "round_robin"
    }
}

/// Always `0, 1, .., n-1`.
#[derive(Debug, Default)]
pub struct SequentialPolicy;

impl SequentialPolicy {
    pub fn new() -> Self {
        Self
    }
}

impl SelectionPolicy for SequentialPolicy {
    fn list(&self, pool_size: usize) -> Vec<usize> {
        (0..pool_size).collect()
    }

    fn name(&self) -> &'static str {
        "sequential"
    }
}

/// Static dispatch over the built-in policies.
#[derive(Debug)]
pub enum Policy {
    Random(RandomPolicy),
    RoundRobin(RoundRobinPolicy),
    Sequential(SequentialPolicy),
}

impl Policy {
    pub fn random() -> Self {
        Self::Random(RandomPolicy::new())
    }

    pub fn round_robin() -> Self {
        Self::RoundRobin(RoundRobinPolicy::new())
    }

    pub fn sequential() -> Self {
        Self::Sequential(SequentialPolicy::new())
    }
}

impl From<UpstreamPolicy> for Policy {
    fn from(policy: UpstreamPolicy) -> Self {
        match policy {
            UpstreamPolicy::Random => Self::random(),
            UpstreamPolicy::RoundRobin => Self::round_robin(),
            UpstreamPolicy::Sequential => Self::sequential(),
        }
    }
}

impl SelectionPolicy for Policy {
    fn list(&self, pool_size: usize) -> Vec<usize> {
        match self {
            Self::Random(p) => p.list(pool_size),
            Self::RoundRobin(p) => p.list(pool_size),
            Self::Sequential(p) => p.list(pool_size),
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Self::Random(p) => p.name(),
            Self::RoundRobin(p) => p.name(),
            Self::Sequential(p) => p.name(),
        }
    }
}

impl Default for Policy {
    fn default() -> Self {
        Self::random()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn assert_permutation(order: &[usize], n: usize) {
        let mut sorted = order.to_vec();
        sorted.sort_unstable();
        assert_eq!(sorted, (0..n).collect::<Vec<_>>(), "not a permutation: {:?}", order);
    }

    #[test]
    fn test_every_policy_yields_permutation() {
        let policies = [Policy::random(), Policy::round_robin(), Policy::sequential()];
        for policy in &policies {
            for n in 0..16 {
                assert_permutation(&policy.list(n), n);
            }
        }
    }

    #[test]
    fn test_empty_pool_yields_empty_order() {
        assert!(RandomPolicy::new().list(0).is_empty());
        assert!(RoundRobinPolicy::new().list(0).is_empty());
        assert!(SequentialPolicy::new().list(0).is_empty());
    }

    #[test]
    fn test_sequential_is_identity() {
        assert_eq!(SequentialPolicy::new().list(4), vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_round_robin_advances_by_one() {
        let policy = RoundRobinPolicy::new();
        assert_eq!(policy.list(3), vec![1, 2, 0]);
        assert_eq!(policy.list(3), vec![2, 0, 1]);
        assert_eq!(policy.list(3), vec![0, 1, 2]);
        assert_eq!(policy.list(3), vec![1, 2, 0]);
    }

    #[test]
    fn test_round_robin_single_upstream() {
        let policy = RoundRobinPolicy::new();
        for _ in 0..5 {
            assert_eq!(policy.list(1), vec![0]);
        }
    }

    #[test]
    fn test_round_robin_survives_cursor_wrap() {
        let policy = RoundRobinPolicy {
            cursor: AtomicUsize::new(usize::MAX),
        };
        assert_permutation(&policy.list(3), 3);
        assert_permutation(&policy.list(3), 3);
    }

    #[test]
    fn test_round_robin_concurrent_callers_spread_evenly() {
        const THREADS: usize = 8;
        const CALLS: usize = 300;
        const POOL: usize = 3;

        let policy = Arc::new(RoundRobinPolicy::new());
        let handles: Vec<_> = (0..THREADS)
            .map(|_| {
                let policy = Arc::clone(&policy);
                std::thread::spawn(move || {
                    (0..CALLS)
                        .map(|_| {
                            let order = policy.list(POOL);
                            assert_permutation(&order, POOL);
                            order[0]
                        })
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        let mut starts = [0usize; POOL];
        for handle in handles {
            for start in handle.join().unwrap() {
                starts[start] += 1;
            }
        }

        // No lost updates: every cursor value was handed out exactly once.
        let per_start = THREADS * CALLS / POOL;
        assert_eq!(starts, [per_start; POOL]);
    }

    #[test]
    fn test_random_eventually_varies_first_pick() {
        let policy = RandomPolicy::new();
        let firsts: std::collections::HashSet<usize> =
            (0..200).map(|_| policy.list(4)[0]).collect();
        assert!(firsts.len() > 1);
    }

    #[test]
    fn test_policy_from_config() {
        assert_eq!(Policy::from(UpstreamPolicy::Random).name(), "random");
        assert_eq!(Policy::from(UpstreamPolicy::RoundRobin).name(), "round_robin");
        assert_eq!(Policy::from(UpstreamPolicy::Sequential).name(), "sequential");
        assert_eq!(Policy::default().name(), "random");
    }
}
