/// Handle for cancelling a scheduled task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TaskHandle(u64);

#[derive(Debug, Clone)]
struct Pending<T> {
    handle: TaskHandle,
    due: f64,
    action: T,
}

/// Deferred actions on the simulation clock.
///
/// Nothing runs on its own: the frame loop calls [`Scheduler::advance`] at a
/// tick boundary and applies whatever came due, so a task can never fire in
/// the middle of a physics step.
#[derive(Debug, Clone)]
pub struct Scheduler<T> {
    now: f64,
    next_handle: u64,
    pending: Vec<Pending<T>>,
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self {
            now: 0.0,
            next_handle: 0,
            pending: Vec::new(),
        }
    }
}

impl<T> Scheduler<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulation time in seconds.
    pub fn now(&self) -> f64 {
        self.now
    }

    pub fn schedule_in(&mut self, delay: f64, action: T) -> TaskHandle {
        let handle = TaskHandle(self.next_handle);
        self.next_handle += 1;
        self.pending.push(Pending {
            handle,
            due: self.now + delay.max(0.0),
            action,
        });
        handle
    }

    /// Returns the action if it had not run yet.
    pub fn cancel(&mut self, handle: TaskHandle) -> Option<T> {
        let index = self.pending.iter().position(|p| p.handle == handle)?;
        Some(self.pending.remove(index).action)
    }

    pub fn cancel_all(&mut self) -> usize {
        let dropped = self.pending.len();
        self.pending.clear();
        dropped
    }

    pub fn is_pending(&self, handle: TaskHandle) -> bool {
        self.pending.iter().any(|p| p.handle == handle)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Move the clock forward and hand back every action now due, ordered by
    /// due time then scheduling order.
    pub fn advance(&mut self, dt: f64) -> Vec<T> {
        if dt > 0.0 {
            self.now += dt;
        }
        let now = self.now;

        let mut due = Vec::new();
        let mut i = 0;
        while i < self.pending.len() {
            if self.pending[i].due <= now {
                due.push(self.pending.swap_remove(i));
            } else {
                i += 1;
            }
        }
        due.sort_by(|a, b| a.due.total_cmp(&b.due).then(a.handle.cmp(&b.handle)));
        due.into_iter().map(|p| p.action).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nothing_fires_early() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule_in(1.2, "reload");

        assert!(scheduler.advance(0.6).is_empty());
        assert!(scheduler.advance(0.5).is_empty());
        assert_eq!(scheduler.advance(0.1 + 1e-9), vec!["reload"]);
        assert!(scheduler.is_empty());
    }

    #[test]
    fn due_tasks_come_out_in_order() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule_in(0.3, 3);
        scheduler.schedule_in(0.1, 1);
        scheduler.schedule_in(0.2, 2);
        scheduler.schedule_in(0.1, 10);

        assert_eq!(scheduler.advance(1.0), vec![1, 10, 2, 3]);
    }

    #[test]
    fn cancelled_task_never_runs() {
        let mut scheduler = Scheduler::new();
        let keep = scheduler.schedule_in(0.1, "recoil");
        let drop = scheduler.schedule_in(0.1, "reload");

        assert_eq!(scheduler.cancel(drop), Some("reload"));
        assert_eq!(scheduler.cancel(drop), None);
        assert!(scheduler.is_pending(keep));
        assert_eq!(scheduler.advance(0.2), vec!["recoil"]);
    }

    #[test]
    fn cancel_all_clears_queue() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule_in(0.1, ());
        scheduler.schedule_in(5.0, ());
        assert_eq!(scheduler.cancel_all(), 2);
        assert!(scheduler.advance(10.0).is_empty());
    }

    #[test]
    fn clock_ignores_negative_steps() {
        let mut scheduler: Scheduler<()> = Scheduler::new();
        scheduler.advance(0.5);
        scheduler.advance(-1.0);
        assert_eq!(scheduler.now(), 0.5);
    }
}
