use std::collections::VecDeque;

use crate::error::{Error, Result};
use crate::xml::Node;

/// Configuration of a streaming evaluation.
#[derive(Debug, Clone)]
pub struct StreamingConfig {
    pub max_buffer_size: usize,
    pub max_memory_footprint: f64,
    /// In strict mode, recording a non-streamable expression is an error
    /// instead of a statistic.
    pub strict_mode: bool,
}

impl Default for StreamingConfig {
    fn default() -> Self {
        Self {
            max_buffer_size: 64,
            max_memory_footprint: 0.8,
            strict_mode: false,
        }
    }
}

/// A fixed-capacity ring buffer of recently seen nodes.
#[derive(Debug)]
pub struct NodeBuffer<N: Node> {
    items: VecDeque<N>,
    capacity: usize,
}

impl<N: Node> NodeBuffer<N> {
    pub fn new(capacity: usize) -> Self {
        Self {
            items: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Add a node, evicting the oldest when full. Returns the evicted
    /// node, if any.
    pub fn add(&mut self, node: N) -> Option<N> {
        let evicted = if self.items.len() == self.capacity {
            self.items.pop_front()
        } else {
            None
        };
        self.items.push_back(node);
        evicted
    }

    pub fn size(&self) -> usize {
        self.items.len()
    }

    pub fn contains(&self, node: &N) -> bool {
        self.items.contains(node)
    }

    /// The most recent `n` nodes, oldest first.
    pub fn get_last(&self, n: usize) -> Vec<N> {
        let skip = self.items.len().saturating_sub(n);
        self.items.iter().skip(skip).cloned().collect()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn is_full(&self) -> bool {
        self.items.len() == self.capacity
    }
}

/// Mutable counters of a streamed run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StreamingStats {
    pub nodes_processed: usize,
    pub peak_buffer_size: usize,
    pub non_streamable_count: usize,
    /// Buffer occupancy as a fraction of capacity.
    pub memory_used: f64,
    /// Fraction of processed work that could stream, in `(0, 1]`.
    pub efficiency: f64,
}

/// The mutable state of a streaming evaluation: the node window plus
/// statistics.
#[derive(Debug)]
pub struct StreamingContext<N: Node> {
    config: StreamingConfig,
    buffer: NodeBuffer<N>,
    stats: StreamingStats,
}

impl<N: Node> StreamingContext<N> {
    pub fn new(config: StreamingConfig) -> Self {
        let buffer = NodeBuffer::new(config.max_buffer_size);
        Self {
            config,
            buffer,
            stats: StreamingStats {
                efficiency: 1.0,
                ..StreamingStats::default()
            },
        }
    }

    pub fn config(&self) -> &StreamingConfig {
        &self.config
    }

    pub fn buffer(&self) -> &NodeBuffer<N> {
        &self.buffer
    }

    pub fn buffer_mut(&mut self) -> &mut NodeBuffer<N> {
        &mut self.buffer
    }

    pub fn stats(&self) -> &StreamingStats {
        &self.stats
    }

    pub fn record_node(&mut self, node: N) {
        self.buffer.add(node);
        self.stats.nodes_processed += 1;
        self.stats.peak_buffer_size = self.stats.peak_buffer_size.max(self.buffer.size());
        self.stats.memory_used =
            self.buffer.size() as f64 / self.config.max_buffer_size.max(1) as f64;
        self.recompute_efficiency();
    }

    /// Record that a non-streamable expression was encountered. In
    /// strict mode this aborts the run.
    pub fn record_non_streamable(&mut self, reason: &str) -> Result<()> {
        if self.config.strict_mode {
            let _ = reason;
            return Err(Error::XPSE0001);
        }
        self.stats.non_streamable_count += 1;
        self.recompute_efficiency();
        Ok(())
    }

    fn recompute_efficiency(&mut self) {
        let total = self.stats.nodes_processed + self.stats.non_streamable_count;
        self.stats.efficiency = if total == 0 {
            1.0
        } else {
            (self.stats.nodes_processed as f64 / total as f64).max(f64::MIN_POSITIVE)
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml::simple::SimpleNode;
    use crate::xml::Node as _;

    fn nodes(n: usize) -> Vec<SimpleNode> {
        let mut element = SimpleNode::element("root");
        for i in 0..n {
            element = element.with_child(SimpleNode::element(&format!("n{i}")));
        }
        SimpleNode::document(vec![element]).children()[0].children()
    }

    #[test]
    fn test_ring_buffer_evicts_oldest() {
        let items = nodes(5);
        let mut buffer = NodeBuffer::new(3);
        for node in &items[..3] {
            assert!(buffer.add(node.clone()).is_none());
        }
        assert!(buffer.is_full());
        let evicted = buffer.add(items[3].clone()).unwrap();
        assert_eq!(evicted, items[0]);
        assert_eq!(buffer.size(), 3);
        assert!(!buffer.contains(&items[0]));
        assert!(buffer.contains(&items[3]));
        assert_eq!(buffer.get_last(2), vec![items[2].clone(), items[3].clone()]);
        buffer.clear();
        assert_eq!(buffer.size(), 0);
    }

    #[test]
    fn test_stats_track_processing() {
        let items = nodes(4);
        let mut streaming = StreamingContext::new(StreamingConfig {
            max_buffer_size: 2,
            ..StreamingConfig::default()
        });
        for node in items {
            streaming.record_node(node);
        }
        let stats = streaming.stats();
        assert_eq!(stats.nodes_processed, 4);
        assert_eq!(stats.peak_buffer_size, 2);
        assert_eq!(stats.memory_used, 1.0);
        assert_eq!(stats.efficiency, 1.0);
    }

    #[test]
    fn test_non_streamable_counting_and_strict_mode() {
        let mut relaxed = StreamingContext::<SimpleNode>::new(StreamingConfig::default());
        relaxed.record_non_streamable("following axis").unwrap();
        assert_eq!(relaxed.stats().non_streamable_count, 1);
        assert!(relaxed.stats().efficiency > 0.0);

        let mut strict = StreamingContext::<SimpleNode>::new(StreamingConfig {
            strict_mode: true,
            ..StreamingConfig::default()
        });
        assert_eq!(
            strict.record_non_streamable("following axis"),
            Err(Error::XPSE0001)
        );
    }
}
