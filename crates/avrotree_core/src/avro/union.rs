use std::sync::Arc;

use crate::avro::context::Builder;
use crate::avro::io::{AvroRead, AvroWrite};
use crate::avro::value::ValueType;
use crate::avro::{AvroError, Datum, ParentLink, Result, SchemaKind, SchemaNode, Shape, ValueContext, ValueNode};

/// Union state: the selected branch and the node built for it.
pub(crate) struct UnionValue<'s> {
	pub(crate) branches: Vec<SchemaNode<'s>>,
	pub(crate) selected: Option<(usize, Box<ValueNode<'s>>)>,
	link: ParentLink,
}

impl<'s> UnionValue<'s> {
	pub(crate) fn create(builder: &mut Builder<'_, 's>, schema: SchemaNode<'s>, link: ParentLink) -> Result<Self> {
		let branches = union_branches(builder.context(), schema)?;
		Ok(Self {
			branches,
			selected: None,
			link,
		})
	}

	/// Select `index`, building its node unless it is already the current branch.
	pub(crate) fn select(&mut self, cx: &Arc<ValueContext<'s>>, index: usize) -> Result<&mut ValueNode<'s>> {
		let branch = *self.branches.get(index).ok_or(AvroError::UnionBranchOutOfRange {
			index: index as i64,
			branches: self.branches.len(),
		})?;
		let keep = matches!(&self.selected, Some((current, _)) if *current == index);
		if !keep {
			self.selected = None;
			let node = cx.build(branch, Some(self.link))?;
			tracing::trace!(index, kind = %node.kind(), "union branch rebuilt");
			self.selected = Some((index, Box::new(node)));
		}
		match self.selected.as_mut() {
			Some((_, node)) => Ok(&mut **node),
			None => Err(AvroError::ValueNotSet { kind: SchemaKind::Union }),
		}
	}
}

/// Validate a union's branch list; every branch must resolve and none may be a union.
pub(crate) fn union_branches<'s>(cx: &ValueContext<'s>, schema: SchemaNode<'s>) -> Result<Vec<SchemaNode<'s>>> {
	let list = schema.list().ok_or_else(|| AvroError::InvalidSchema {
		detail: "union must be a list".to_owned(),
	})?;
	let branches: Vec<_> = list.collect();
	if branches.is_empty() {
		return Err(AvroError::InvalidSchema {
			detail: "union has no branches".to_owned(),
		});
	}
	for branch in &branches {
		if matches!(branch.shape()?, Shape::Kind(SchemaKind::Union)) {
			return Err(AvroError::InvalidSchema {
				detail: "union directly contains a union".to_owned(),
			});
		}
		cx.resolve(*branch)?;
	}
	Ok(branches)
}

impl<'s> ValueType<'s> for UnionValue<'s> {
	fn is_set(&self) -> bool {
		self.selected.as_ref().is_some_and(|(_, node)| node.is_set())
	}

	fn reset(&mut self) {
		if let Some((_, node)) = self.selected.as_mut() {
			node.clear();
		}
	}

	fn read(&mut self, cx: &Arc<ValueContext<'s>>, reader: &mut dyn AvroRead) -> Result<()> {
		self.reset();
		let raw = reader.read_long()?;
		let index = usize::try_from(raw).ok().filter(|idx| *idx < self.branches.len()).ok_or(AvroError::UnionBranchOutOfRange {
			index: raw,
			branches: self.branches.len(),
		})?;
		self.select(cx, index)?.read_dyn(reader)
	}

	fn write(&self, _cx: &ValueContext<'s>, writer: &mut dyn AvroWrite) -> Result<()> {
		let Some((index, node)) = &self.selected else {
			return Err(AvroError::ValueNotSet { kind: SchemaKind::Union });
		};
		writer.write_long(*index as i64)?;
		node.write_dyn(writer)
	}

	fn get(&self) -> Result<Datum> {
		let Some((index, node)) = &self.selected else {
			return Err(AvroError::ValueNotSet { kind: SchemaKind::Union });
		};
		Ok(Datum::Union(*index, Box::new(node.get()?)))
	}

	fn set(&mut self, cx: &Arc<ValueContext<'s>>, datum: &Datum) -> Result<()> {
		let Datum::Union(index, inner) = datum else {
			return Err(AvroError::mismatch(SchemaKind::Union, datum.label()));
		};
		self.select(cx, *index)?.set(inner)
	}
}
