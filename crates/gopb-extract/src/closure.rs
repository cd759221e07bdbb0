//! Dependency closure over referenced struct types.
//!
//! Names are marked when they are enqueued, so each struct is described at
//! most once no matter how many fields reference it, and self- or
//! mutually-referential structs terminate. Types come out in queue order,
//! which is breadth-first from the seeds.

use std::collections::{HashSet, VecDeque};

use gopb_schemas::{Field, TypeDescriptor};
use tracing::{debug, warn};

use crate::extract::{StructIndex, describe_struct};

/// Worklist state for one resolution run.
pub(crate) struct Resolver<'a> {
    structs: &'a StructIndex<'a>,
    /// Every name ever enqueued.
    scheduled: HashSet<String>,
    queue: VecDeque<String>,
    /// The explicitly requested root and the fields to keep on it.
    root: Option<(String, Vec<String>)>,
}

impl<'a> Resolver<'a> {
    pub(crate) fn new(structs: &'a StructIndex<'a>) -> Self {
        Self {
            structs,
            scheduled: HashSet::new(),
            queue: VecDeque::new(),
            root: None,
        }
    }

    /// Enqueues every message referenced by the given fields.
    pub(crate) fn seed_fields<'f>(
        &mut self,
        fields: impl IntoIterator<Item = &'f Field>,
    ) {
        for field in fields {
            for name in field.ty.referenced_messages() {
                self.schedule(name);
            }
        }
    }

    /// Enqueues an explicitly requested struct, optionally restricted to
    /// some of its fields. Unknown names are ignored.
    pub(crate) fn seed_root(&mut self, name: &str, fields: &[String]) {
        if !self.structs.contains_key(name) {
            debug!(root = %name, "struct selector matched nothing");
            return;
        }
        self.root = Some((name.to_owned(), fields.to_vec()));
        self.schedule(name);
    }

    fn schedule(&mut self, name: &str) {
        if self.scheduled.insert(name.to_owned()) {
            self.queue.push_back(name.to_owned());
        }
    }

    /// Drains the queue, describing each struct and scheduling the structs
    /// its fields reference.
    pub(crate) fn resolve(mut self) -> Vec<TypeDescriptor> {
        let structs = self.structs;
        let mut types = Vec::new();
        while let Some(name) = self.queue.pop_front() {
            let Some(decl) = structs.get(name.as_str()) else {
                warn!(
                    type_name = %name,
                    "no struct declaration in this file, keeping the \
                     reference as written"
                );
                continue;
            };

            let mut fields = describe_struct(decl);
            if let Some((_, keep)) = self
                .root
                .as_ref()
                .filter(|(root, keep)| *root == name && !keep.is_empty())
            {
                fields.retain(|field| keep.contains(&field.name));
            }
            self.seed_fields(&fields);

            types.push(TypeDescriptor {
                name,
                doc: decl.doc.to_owned(),
                fields,
            });
        }
        types
    }
}
