// slicehouse/src/pipeline/execution.rs

//! `Pipeline::run`: walks the steps and drives each hook phase.

use super::context_data::ContextData;
use super::control::{PipelineControl, PipelineResult};
use super::definition::Pipeline;
use super::step::Handler;
use crate::error::PipelineError;
use tracing::{event, instrument, span, Instrument, Level};

impl<TData, Err> Pipeline<TData, Err>
where
  TData: 'static + Send + Sync,
  Err: std::error::Error + From<PipelineError> + Send + Sync + 'static,
{
  /// Executes the steps against `ctx_data`.
  ///
  /// The first handler error aborts the run and is returned unchanged. A
  /// handler returning `Stop` ends the run with `PipelineResult::Stopped`.
  #[instrument(
    name = "Pipeline::run",
    skip_all,
    fields(context_type = %std::any::type_name::<TData>(), num_steps = self.steps.len()),
    err(Display)
  )]
  pub async fn run(&self, ctx_data: ContextData<TData>) -> Result<PipelineResult, Err> {
    for (step_idx, step_def) in self.steps.iter().enumerate() {
      let step_name = step_def.name.as_str();

      if let Some(skip_if) = &step_def.skip_if {
        if skip_if(ctx_data.clone()) {
          event!(Level::DEBUG, step = step_name, "Step skipped by condition.");
          continue;
        }
      }

      let before = non_empty(self.before.get(step_name));
      let on = non_empty(self.on.get(step_name));
      let after = non_empty(self.after.get(step_name));

      if before.is_none() && on.is_none() && after.is_none() {
        if step_def.optional {
          event!(Level::DEBUG, step = step_name, "Optional step has no handlers.");
          continue;
        }
        return Err(Err::from(PipelineError::HandlerMissing {
          step_name: step_def.name.clone(),
        }));
      }

      let step_span = span!(Level::DEBUG, "pipeline_step", step = step_name, index = step_idx);
      for (phase, handlers) in [("before", before), ("on", on), ("after", after)] {
        let Some(handlers) = handlers else { continue };
        let control = run_phase(handlers, &ctx_data)
          .instrument(step_span.clone())
          .await?;
        if control == PipelineControl::Stop {
          event!(Level::INFO, step = step_name, phase, "Pipeline stopped by handler.");
          return Ok(PipelineResult::Stopped);
        }
      }
    }

    Ok(PipelineResult::Completed)
  }
}

fn non_empty<T>(handlers: Option<&Vec<T>>) -> Option<&[T]> {
  handlers.filter(|v| !v.is_empty()).map(Vec::as_slice)
}

async fn run_phase<TData, Err>(
  handlers: &[Handler<TData, Err>],
  ctx_data: &ContextData<TData>,
) -> Result<PipelineControl, Err>
where
  TData: 'static + Send + Sync,
  Err: std::error::Error + Send + Sync + 'static,
{
  for handler in handlers {
    match handler(ctx_data.clone()).await {
      Ok(PipelineControl::Continue) => {}
      Ok(PipelineControl::Stop) => return Ok(PipelineControl::Stop),
      Err(e) => {
        event!(Level::DEBUG, error = %e, "Step handler failed.");
        return Err(e);
      }
    }
  }
  Ok(PipelineControl::Continue)
}
