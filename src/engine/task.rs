//! Render task queue and positional output buffers.
//!
//! The walker enqueues tasks in the exact order their markup must appear;
//! each task is bound at creation time to a fixed position from a single
//! monotonically increasing counter shared by every task kind. Draining is a
//! single-lane asynchronous loop: one task in flight at a time, the next not
//! started until the previous completed. Ordering of the output is carried by
//! the positions, never by execution timing.

use crate::{
    foundation::error::TableResult,
    pack::templates::{TemplatePack, TemplateParams},
};

#[derive(Clone, Debug)]
/// A deferred unit of render work bound to a fixed output position.
pub struct RenderTask {
    /// Output position assigned at enqueue time.
    pub pos: usize,
    /// What to render.
    pub kind: TaskKind,
}

#[derive(Clone, Debug)]
/// Task payload: the template key plus the parameters captured at creation.
pub enum TaskKind {
    /// Structural tag; one fragment copied into both output buffers.
    Tag {
        /// Template key to invoke.
        template: String,
        /// Parameters captured at enqueue time.
        params: TemplateParams,
    },
    /// Field-level task; renders twice, the second time with the value forced
    /// absent to seed the reusable-template buffer.
    Field {
        /// Template key to invoke.
        template: String,
        /// Parameters captured at enqueue time.
        params: TemplateParams,
    },
}

#[derive(Debug, Default)]
/// Ordered task list with the shared position counter.
pub struct RenderQueue {
    tasks: Vec<RenderTask>,
    next_pos: usize,
}

impl RenderQueue {
    /// Create an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a structural tag task; returns its position.
    pub fn enqueue_tag(&mut self, template: impl Into<String>, params: TemplateParams) -> usize {
        self.enqueue(TaskKind::Tag {
            template: template.into(),
            params,
        })
    }

    /// Append a field task; returns its position.
    pub fn enqueue_field(&mut self, template: impl Into<String>, params: TemplateParams) -> usize {
        self.enqueue(TaskKind::Field {
            template: template.into(),
            params,
        })
    }

    fn enqueue(&mut self, kind: TaskKind) -> usize {
        let pos = self.next_pos;
        self.next_pos += 1;
        self.tasks.push(RenderTask { pos, kind });
        pos
    }

    /// Number of enqueued tasks.
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Whether no tasks have been enqueued.
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Enqueued tasks in execution order.
    pub fn tasks(&self) -> &[RenderTask] {
        &self.tasks
    }

    /// Execute all tasks strictly in order, one at a time, waiting for each
    /// to complete before starting the next.
    ///
    /// The first task error aborts the drain; remaining tasks never execute
    /// and the partially filled buffers are dropped with the error.
    pub async fn drain<P: TemplatePack>(&self, pack: &P) -> TableResult<OutputBuffers> {
        let mut out = OutputBuffers::with_len(self.tasks.len());

        for task in &self.tasks {
            match &task.kind {
                TaskKind::Tag { template, params } => {
                    let html = pack.render(template, params).await?;
                    out.write(task.pos, html.clone(), html);
                }
                TaskKind::Field { template, params } => {
                    let html = pack.render(template, params).await?;
                    let mut dummy_params = params.clone();
                    dummy_params.val = None;
                    let dummy = pack.render(template, &dummy_params).await?;
                    out.write(task.pos, html, dummy);
                }
            }
        }

        Ok(out)
    }
}

#[derive(Debug)]
/// Two equal-length position-indexed fragment sequences: the data-bound
/// output and the dummy/template output.
pub struct OutputBuffers {
    data: Vec<Option<String>>,
    template: Vec<Option<String>>,
}

impl OutputBuffers {
    fn with_len(len: usize) -> Self {
        Self {
            data: vec![None; len],
            template: vec![None; len],
        }
    }

    fn write(&mut self, pos: usize, data: String, template: String) {
        self.data[pos] = Some(data);
        self.template[pos] = Some(template);
    }

    /// Data fragment at `pos`, if the owning task completed.
    pub fn data_at(&self, pos: usize) -> Option<&str> {
        self.data.get(pos).and_then(|slot| slot.as_deref())
    }

    /// Ordered concatenation of the data-bound sequence.
    pub fn join_data(&self) -> String {
        join(&self.data)
    }

    /// Ordered concatenation of the dummy/template sequence.
    pub fn join_template(&self) -> String {
        join(&self.template)
    }
}

fn join(slots: &[Option<String>]) -> String {
    let mut out = String::new();
    for slot in slots.iter().flatten() {
        out.push_str(slot);
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/engine/task.rs"]
mod tests;
