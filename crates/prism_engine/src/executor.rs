//! Graphics-thread confinement
//!
//! All GPU-facing structures are mutated by exactly one thread. Instead of
//! ad hoc thread-id comparisons scattered through the code, this module
//! gives that rule a shape:
//!
//! - [`GraphicsContext`] captures the owning thread and answers "am I on
//!   it?"
//! - [`GraphicsHandle`] wraps a value that can only be reached from the
//!   owning thread
//! - [`DeferredQueue`] carries fire-and-forget tasks from other threads to
//!   the owning thread, which drains them at a frame boundary — never
//!   mid-frame
//!
//! There is no locking here by design: safety comes from confining all
//! mutation to the one thread and handing work across via the queue.

use std::sync::mpsc::{channel, Receiver, Sender};
use std::thread::{self, ThreadId};

/// Identity of the thread that owns the graphics state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GraphicsContext {
    thread: ThreadId,
}

impl GraphicsContext {
    /// Capture the calling thread as the graphics thread
    pub fn capture() -> Self {
        Self {
            thread: thread::current().id(),
        }
    }

    /// Whether the calling thread is the graphics thread
    pub fn is_current(&self) -> bool {
        thread::current().id() == self.thread
    }
}

/// A value reachable only from the graphics thread
///
/// Off-thread access yields `None` instead of risking a use of GPU state
/// from the wrong thread.
#[derive(Debug)]
pub struct GraphicsHandle<T> {
    value: T,
    context: GraphicsContext,
}

impl<T> GraphicsHandle<T> {
    /// Wrap a value, capturing the calling thread as its owner
    pub fn new(value: T) -> Self {
        Self {
            value,
            context: GraphicsContext::capture(),
        }
    }

    /// Borrow the value; `None` off the graphics thread
    pub fn get(&self) -> Option<&T> {
        self.context.is_current().then_some(&self.value)
    }

    /// Mutably borrow the value; `None` off the graphics thread
    pub fn get_mut(&mut self) -> Option<&mut T> {
        self.context.is_current().then_some(&mut self.value)
    }

    /// The owning context
    pub fn context(&self) -> GraphicsContext {
        self.context
    }
}

/// A deferred task applied to the owning structure on the graphics thread
pub type Task<T> = Box<dyn FnOnce(&mut T) + Send>;

/// Receiving end of the cross-thread hand-off
///
/// Owned by the graphics-thread structure it feeds (e.g. the render
/// pipeline). Tasks are submitted through [`DeferredHandle`]s and run when
/// the owner drains the queue between frames.
pub struct DeferredQueue<T> {
    sender: Sender<Task<T>>,
    receiver: Receiver<Task<T>>,
}

impl<T> Default for DeferredQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> DeferredQueue<T> {
    /// Create an empty queue
    pub fn new() -> Self {
        let (sender, receiver) = channel();
        Self { sender, receiver }
    }

    /// A clonable submitter usable from any thread
    pub fn handle(&self) -> DeferredHandle<T> {
        DeferredHandle {
            sender: self.sender.clone(),
        }
    }

    /// Take every pending task without running it
    ///
    /// Lets the owner end the borrow of the queue before applying the tasks
    /// to itself.
    pub fn collect_pending(&self) -> Vec<Task<T>> {
        self.receiver.try_iter().collect()
    }

    /// Run every pending task against `target`; returns how many ran
    pub fn drain(&self, target: &mut T) -> usize {
        let tasks = self.collect_pending();
        let count = tasks.len();
        for task in tasks {
            task(target);
        }
        count
    }
}

/// Clonable, `Send` submitter for a [`DeferredQueue`]
pub struct DeferredHandle<T> {
    sender: Sender<Task<T>>,
}

impl<T> Clone for DeferredHandle<T> {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
        }
    }
}

impl<T> DeferredHandle<T> {
    /// Submit a task to run on the graphics thread at the next frame
    /// boundary
    ///
    /// Fire-and-forget: the caller does not wait, and a task submitted
    /// after the queue's owner is gone is silently dropped.
    pub fn submit(&self, task: impl FnOnce(&mut T) + Send + 'static) {
        if self.sender.send(Box::new(task)).is_err() {
            log::debug!("deferred task dropped: graphics queue is gone");
        }
    }
}
