use std::future::Future;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

/// How often every periodic task of the bot runs.
pub const TICK_INTERVAL: Duration = Duration::from_secs(60);

/// A unit of work run on a fixed interval until it's cancelled.
///
/// Failures are expected to be logged inside `tick`; the next tick runs regardless.
pub trait PeriodicTask: Send + 'static {
  fn name(&self) -> &'static str;

  fn tick(&mut self) -> impl Future<Output = ()> + Send;
}

#[derive(Debug)]
struct TaskHandle {
  name: &'static str,
  cancellation_sender: watch::Sender<bool>,
  join_handle: JoinHandle<()>,
}

/// Owns every spawned periodic task, each with its own cancellation channel.
#[derive(Debug, Default)]
pub struct TaskRegistry {
  tasks: Vec<TaskHandle>,
}

impl TaskRegistry {
  pub fn is_empty(&self) -> bool {
    self.tasks.is_empty()
  }

  /// Names of the registered tasks in registration order.
  pub fn task_names(&self) -> Vec<&'static str> {
    self.tasks.iter().map(|task| task.name).collect()
  }

  /// Spawns `task` onto the runtime. The first tick happens immediately.
  pub fn spawn<T: PeriodicTask>(&mut self, task: T, period: Duration) {
    let name = task.name();
    let (cancellation_sender, cancellation_receiver) = watch::channel(false);

    tracing::info!("Starting the {} task.", name);

    let join_handle = tokio::spawn(run_periodic(task, period, cancellation_receiver));

    self.tasks.push(TaskHandle {
      name,
      cancellation_sender,
      join_handle,
    });
  }

  /// Cancels every task in reverse registration order, waiting for each loop to exit.
  ///
  /// A tick that's still running is dropped. Tasks that haven't exited once
  /// `timeout` has passed are aborted.
  pub async fn shutdown(&mut self, timeout: Duration) {
    let deadline = Instant::now() + timeout;

    while let Some(mut task) = self.tasks.pop() {
      tracing::info!("Stopping the {} task.", task.name);

      let _ = task.cancellation_sender.send(true);

      match tokio::time::timeout_at(deadline, &mut task.join_handle).await {
        Ok(Ok(())) => (),
        Ok(Err(error)) => tracing::error!(
          "The {} task ended with an error: {}",
          task.name,
          error
        ),
        Err(_) => {
          tracing::error!("The {} task didn't stop in time. Aborting it.", task.name);

          task.join_handle.abort();
        }
      }
    }
  }
}

async fn run_periodic<T: PeriodicTask>(
  mut task: T,
  period: Duration,
  mut cancellation_receiver: watch::Receiver<bool>,
) {
  let mut interval = tokio::time::interval(period);

  interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

  loop {
    tokio::select! {
      biased;

      _ = cancellation_receiver.changed() => break,

      _ = interval.tick() => (),
    }

    tokio::select! {
      biased;

      _ = cancellation_receiver.changed() => break,

      _ = task.tick() => (),
    }
  }

  tracing::debug!("The {} task has stopped.", task.name());
}
