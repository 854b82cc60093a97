use tracing::{debug, warn};

use crate::error::RegistryError;

use super::record::{Pid, ProcessRecord};

/// Index of the permanent anchor node; never a real process
const SENTINEL: usize = 0;

/// Arena slot holding one list node
#[derive(Debug)]
struct Node {
    record: Option<ProcessRecord>,
    generation: u32,
    prev: usize,
    next: usize,
}

impl Node {
    fn unlinked(index: usize) -> Self {
        Self {
            record: None,
            generation: 0,
            prev: index,
            next: index,
        }
    }
}

/// Stable reference to a record in the registry
///
/// A handle goes stale once its record is removed; reusing the slot bumps the
/// generation, so a stale handle can never alias a newer record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RecordHandle {
    index: usize,
    generation: u32,
}

/// Registry of tracked child processes
///
/// A circular doubly linked list laid out in an arena. Slot 0 is the sentinel:
/// `sentinel.next == sentinel.prev == sentinel` exactly when nothing is tracked.
/// New records are linked directly after the sentinel, so traversal yields the
/// newest record first.
#[derive(Debug)]
pub struct ProcessRegistry {
    nodes: Vec<Node>,
    free: Vec<usize>, // vacant slots available for reuse
    len: usize,
}

impl ProcessRegistry {
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::unlinked(SENTINEL)],
            free: Vec::new(),
            len: 0,
        }
    }

    /// Allocate the sentinel without aborting on allocation failure
    pub fn create() -> Result<Self, RegistryError> {
        let mut nodes = Vec::new();
        nodes.try_reserve(1)?;
        nodes.push(Node::unlinked(SENTINEL));
        Ok(Self {
            nodes,
            free: Vec::new(),
            len: 0,
        })
    }

    /// Track a new child, linking it immediately after the sentinel
    ///
    /// Every allocation happens before any link is touched, so a failure leaves
    /// the registry exactly as it was.
    pub fn insert(&mut self, pid: Pid, path: &str) -> Result<RecordHandle, RegistryError> {
        // PIDs are recycled by the OS; a stale entry can alias a new child.
        if self.find(pid).is_some() {
            warn!(
                "PID {} is already tracked; the existing entry may refer to a process that no longer exists",
                pid
            );
        }

        let mut owned_path = String::new();
        owned_path.try_reserve_exact(path.len())?;
        owned_path.push_str(path);

        let index = match self.free.pop() {
            Some(index) => index,
            None => {
                self.nodes.try_reserve(1)?;
                // Keep room for every slot in the free list so `remove` never allocates
                self.free.try_reserve(self.nodes.len())?;
                self.nodes.push(Node::unlinked(self.nodes.len()));
                self.nodes.len() - 1
            }
        };

        let first = self.nodes[SENTINEL].next;
        let node = &mut self.nodes[index];
        node.record = Some(ProcessRecord::new(pid, owned_path));
        node.prev = SENTINEL;
        node.next = first;
        let generation = node.generation;

        self.nodes[first].prev = index;
        self.nodes[SENTINEL].next = index;
        self.len += 1;

        debug!("Registered PID {} in slot {}", pid, index);

        Ok(RecordHandle { index, generation })
    }

    /// Unlink a record and hand it back to the caller
    pub fn remove(&mut self, handle: RecordHandle) -> Result<ProcessRecord, RegistryError> {
        let index = self.resolve(handle).ok_or(RegistryError::InvalidHandle)?;

        let (prev, next) = {
            let node = &self.nodes[index];
            (node.prev, node.next)
        };
        self.nodes[prev].next = next;
        self.nodes[next].prev = prev;

        let node = &mut self.nodes[index];
        let record = node.record.take().ok_or(RegistryError::InvalidHandle)?;
        node.generation = node.generation.wrapping_add(1);
        node.prev = index;
        node.next = index;

        self.free.push(index);
        self.len -= 1;

        debug!("Unregistered PID {} from slot {}", record.pid(), index);

        Ok(record)
    }

    /// Linear scan from the newest record; the sentinel never matches
    pub fn find(&self, pid: Pid) -> Option<RecordHandle> {
        self.iter()
            .find(|(_, record)| record.pid() == pid)
            .map(|(handle, _)| handle)
    }

    pub fn get(&self, handle: RecordHandle) -> Option<&ProcessRecord> {
        let index = self.resolve(handle)?;
        self.nodes[index].record.as_ref()
    }

    pub fn get_mut(&mut self, handle: RecordHandle) -> Option<&mut ProcessRecord> {
        let index = self.resolve(handle)?;
        self.nodes[index].record.as_mut()
    }

    /// Forward traversal from the sentinel back to the sentinel
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            registry: self,
            cursor: self.nodes[SENTINEL].next,
        }
    }

    /// Snapshot of all handles in traversal order
    /// Used by passes that remove records while walking the list
    pub fn handles(&self) -> Vec<RecordHandle> {
        self.iter().map(|(handle, _)| handle).collect()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        let sentinel = &self.nodes[SENTINEL];
        sentinel.next == SENTINEL && sentinel.prev == SENTINEL
    }

    /// Check the structural invariants of the list
    ///
    /// Links are symmetric for every node including the sentinel, every record
    /// is reachable from the sentinel, and vacant slots hold no record.
    pub fn is_consistent(&self) -> bool {
        if self.nodes.is_empty() || self.nodes[SENTINEL].record.is_some() {
            return false;
        }

        let mut cursor = SENTINEL;
        let mut visited = 0usize;
        loop {
            let next = self.nodes[cursor].next;
            if next >= self.nodes.len() || self.nodes[next].prev != cursor {
                return false;
            }
            cursor = next;
            if cursor == SENTINEL {
                break;
            }
            if self.nodes[cursor].record.is_none() {
                return false;
            }
            visited += 1;
            if visited > self.nodes.len() {
                // cycle that never returns to the sentinel
                return false;
            }
        }

        let vacant = self
            .free
            .iter()
            .filter(|&&index| self.nodes[index].record.is_none())
            .count();

        visited == self.len && vacant == self.free.len() && self.len + vacant + 1 == self.nodes.len()
    }

    fn resolve(&self, handle: RecordHandle) -> Option<usize> {
        if handle.index == SENTINEL {
            return None;
        }
        let node = self.nodes.get(handle.index)?;
        if node.generation != handle.generation || node.record.is_none() {
            return None;
        }
        Some(handle.index)
    }
}

impl Default for ProcessRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator over `(handle, record)` pairs, newest first
pub struct Iter<'a> {
    registry: &'a ProcessRegistry,
    cursor: usize,
}

impl<'a> Iterator for Iter<'a> {
    type Item = (RecordHandle, &'a ProcessRecord);

    fn next(&mut self) -> Option<Self::Item> {
        while self.cursor != SENTINEL {
            let index = self.cursor;
            let node = &self.registry.nodes[index];
            self.cursor = node.next;
            if let Some(record) = node.record.as_ref() {
                let handle = RecordHandle {
                    index,
                    generation: node.generation,
                };
                return Some((handle, record));
            }
        }
        None
    }
}
