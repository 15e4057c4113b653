//! Fetch-and-render pipeline: independent fetch tasks, each feeding its own
//! renderers, with failures contained per task.

use std::{marker::PhantomData, sync::Arc};

use async_trait::async_trait;
use tokio::task::JoinSet;
use tracing::{debug, error, warn};

use crate::{
    error::FetchError,
    model::Resolve,
    transport::DashboardHttp,
    view::{PageView, SharedView},
};

/// Projects a resolved payload onto the page.
pub type Renderer<T> = Box<dyn Fn(&T, &mut PageView) + Send + Sync>;

#[derive(Debug)]
pub enum TaskOutcome {
    Rendered {
        task: &'static str,
        renderers: Vec<&'static str>,
    },
    Skipped {
        task: &'static str,
        error: FetchError,
    },
    Panicked {
        task: &'static str,
    },
}

impl TaskOutcome {
    pub fn task(&self) -> &'static str {
        match self {
            TaskOutcome::Rendered { task, .. }
            | TaskOutcome::Skipped { task, .. }
            | TaskOutcome::Panicked { task } => *task,
        }
    }

    pub fn is_rendered(&self) -> bool {
        matches!(self, TaskOutcome::Rendered { .. })
    }
}

#[async_trait]
pub trait PipelineTask: Send + Sync {
    fn name(&self) -> &'static str;
    fn endpoint(&self) -> &'static str;
    async fn run(&self, http: &DashboardHttp, view: &SharedView) -> TaskOutcome;
}

/// One endpoint and the renderers its payload feeds, run in registration
/// order. Later renderers may rely on what earlier ones wrote.
pub struct FetchTask<W: Resolve> {
    name: &'static str,
    endpoint: &'static str,
    renderers: Vec<(&'static str, Renderer<W::Output>)>,
    _payload: PhantomData<fn() -> W>,
}

impl<W: Resolve> FetchTask<W> {
    pub fn new(name: &'static str, endpoint: &'static str) -> Self {
        Self {
            name,
            endpoint,
            renderers: Vec::new(),
            _payload: PhantomData,
        }
    }

    pub fn render_with<F>(mut self, name: &'static str, renderer: F) -> Self
    where
        F: Fn(&W::Output, &mut PageView) + Send + Sync + 'static,
    {
        self.renderers.push((name, Box::new(renderer)));
        self
    }

    pub fn renderer_names(&self) -> Vec<&'static str> {
        self.renderers.iter().map(|(name, _)| *name).collect()
    }
}

#[async_trait]
impl<W: Resolve> PipelineTask for FetchTask<W> {
    fn name(&self) -> &'static str {
        self.name
    }

    fn endpoint(&self) -> &'static str {
        self.endpoint
    }

    async fn run(&self, http: &DashboardHttp, view: &SharedView) -> TaskOutcome {
        let payload = match http.get_json::<W>(self.endpoint).await {
            Ok(response) => response.resolve(),
            Err(error) => {
                warn!(
                    task = self.name,
                    endpoint = self.endpoint,
                    error = %error,
                    "no data for section; renderers skipped"
                );
                return TaskOutcome::Skipped {
                    task: self.name,
                    error,
                };
            }
        };

        let mut view = view.lock().await;
        for (renderer, render) in &self.renderers {
            debug!(task = self.name, renderer, "rendering");
            render(&payload, &mut *view);
        }
        TaskOutcome::Rendered {
            task: self.name,
            renderers: self.renderer_names(),
        }
    }
}

#[derive(Debug)]
pub struct PipelineReport {
    pub outcomes: Vec<TaskOutcome>,
}

impl PipelineReport {
    pub fn outcome(&self, task: &str) -> Option<&TaskOutcome> {
        self.outcomes.iter().find(|outcome| outcome.task() == task)
    }

    pub fn rendered(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.outcomes
            .iter()
            .filter(|outcome| outcome.is_rendered())
            .map(TaskOutcome::task)
    }

    pub fn all_rendered(&self) -> bool {
        self.outcomes.iter().all(TaskOutcome::is_rendered)
    }
}

/// The fixed task list of a page.
pub struct Pipeline {
    name: &'static str,
    tasks: Vec<Arc<dyn PipelineTask>>,
}

impl Pipeline {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            tasks: Vec::new(),
        }
    }

    pub fn task(mut self, task: impl PipelineTask + 'static) -> Self {
        self.tasks.push(Arc::new(task));
        self
    }

    pub fn task_names(&self) -> Vec<&'static str> {
        self.tasks.iter().map(|task| task.name()).collect()
    }

    /// Starts every task at once and waits for all of them. Never fails: the
    /// report carries one outcome per task, in declaration order.
    pub async fn run(&self, http: &DashboardHttp, view: &SharedView) -> PipelineReport {
        let mut running = JoinSet::new();
        for (index, task) in self.tasks.iter().enumerate() {
            let task = Arc::clone(task);
            let http = http.clone();
            let view = Arc::clone(view);
            running.spawn(async move { (index, task.run(&http, &view).await) });
        }

        let mut finished: Vec<Option<TaskOutcome>> = self.tasks.iter().map(|_| None).collect();
        while let Some(joined) = running.join_next().await {
            match joined {
                Ok((index, outcome)) => finished[index] = Some(outcome),
                Err(err) => error!(pipeline = self.name, error = %err, "fetch task aborted"),
            }
        }

        let outcomes = finished
            .into_iter()
            .zip(&self.tasks)
            .map(|(outcome, task)| {
                outcome.unwrap_or(TaskOutcome::Panicked { task: task.name() })
            })
            .collect();
        debug!(pipeline = self.name, "pipeline finished");
        PipelineReport { outcomes }
    }
}

#[cfg(test)]
#[path = "tests/pipeline_tests.rs"]
mod tests;
