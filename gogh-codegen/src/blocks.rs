//! Ordered text buffers.
//!
//! A file body is a doubly linked chain of blocks. Writers append to the
//! block they point at and may insert new blocks right after it, so code
//! can be written out of temporal order while [`BlockChain::collect`]
//! always yields the spatial order.

/// Handle of a block inside a [`BlockChain`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlockId(usize);

#[derive(Debug, Default)]
struct Block {
    prev: Option<BlockId>,
    next: Option<BlockId>,
    data: String,
}

/// Doubly linked chain of text blocks.
#[derive(Debug)]
pub struct BlockChain {
    blocks: Vec<Block>,
}

impl Default for BlockChain {
    fn default() -> Self {
        Self::new()
    }
}

impl BlockChain {
    /// Create a chain with a single empty block.
    pub fn new() -> Self {
        Self {
            blocks: vec![Block::default()],
        }
    }

    pub fn first(&self) -> BlockId {
        let mut id = BlockId(0);
        while let Some(prev) = self.blocks[id.0].prev {
            id = prev;
        }
        id
    }

    /// Insert an empty block right after `at` and return it.
    pub fn insert_after(&mut self, at: BlockId) -> BlockId {
        let id = BlockId(self.blocks.len());
        let next = self.blocks[at.0].next;
        self.blocks.push(Block {
            prev: Some(at),
            next,
            data: String::new(),
        });
        if let Some(next) = next {
            self.blocks[next.0].prev = Some(id);
        }
        self.blocks[at.0].next = Some(id);
        id
    }

    pub fn write(&mut self, id: BlockId, text: &str) {
        self.blocks[id.0].data.push_str(text);
    }

    /// Concatenate every block in chain order.
    pub fn collect(&self) -> String {
        let mut result = String::new();
        let mut current = Some(self.first());
        while let Some(id) = current {
            let block = &self.blocks[id.0];
            result.push_str(&block.data);
            current = block.next;
        }
        result
    }
}

/// Position of a writer inside a [`BlockChain`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockCursor {
    current: BlockId,
}

impl BlockCursor {
    pub fn new(current: BlockId) -> Self {
        Self { current }
    }

    /// Insert a block after the current one and move onto it.
    pub fn insert_after_current_and_advance(&mut self, chain: &mut BlockChain) -> &mut Self {
        self.current = chain.insert_after(self.current);
        self
    }

    pub fn write(&self, chain: &mut BlockChain, text: &str) {
        chain.write(self.current, text);
    }
}
