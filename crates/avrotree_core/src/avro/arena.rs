/// Per-container scratch storage that is reset in bulk before every decode.
///
/// Cleared slots are kept as spares and handed back out by [`Arena::alloc_with`],
/// so decoding a stream of same-shaped messages reuses element allocations
/// instead of dropping and rebuilding them. Spares are never observable through
/// [`Arena::live`]; the caller re-initializes a recycled slot before use.
#[derive(Debug)]
pub struct Arena<T> {
	live: Vec<T>,
	spare: Vec<T>,
	generation: u64,
}

impl<T> Default for Arena<T> {
	fn default() -> Self {
		Self::new()
	}
}

impl<T> Arena<T> {
	/// Create an empty arena at generation 0.
	pub fn new() -> Self {
		Self {
			live: Vec::new(),
			spare: Vec::new(),
			generation: 0,
		}
	}

	/// Retire every live slot and start a new generation.
	pub fn clear(&mut self) {
		self.spare.append(&mut self.live);
		self.generation += 1;
	}

	/// Drop spares as well as live slots.
	pub fn release(&mut self) {
		self.live.clear();
		self.spare.clear();
		self.generation += 1;
	}

	/// Push a slot, recycling a spare when one exists, and return it.
	///
	/// `reset` receives the recycled spare; `make` builds a fresh slot when none is left.
	pub fn alloc_with(&mut self, make: impl FnOnce() -> crate::avro::Result<T>, reset: impl FnOnce(&mut T)) -> crate::avro::Result<&mut T> {
		let slot = match self.spare.pop() {
			Some(mut slot) => {
				reset(&mut slot);
				slot
			}
			None => make()?,
		};
		self.live.push(slot);
		let last = self.live.len() - 1;
		Ok(&mut self.live[last])
	}

	/// Live slots in allocation order.
	pub fn live(&self) -> &[T] {
		&self.live
	}

	/// Mutable live slots in allocation order.
	pub fn live_mut(&mut self) -> &mut [T] {
		&mut self.live
	}

	/// Number of live slots.
	pub fn len(&self) -> usize {
		self.live.len()
	}

	/// Whether no slot is live.
	pub fn is_empty(&self) -> bool {
		self.live.is_empty()
	}

	/// Number of retired slots waiting for reuse.
	pub fn spare_len(&self) -> usize {
		self.spare.len()
	}

	/// Count of clears since creation.
	pub fn generation(&self) -> u64 {
		self.generation
	}
}
