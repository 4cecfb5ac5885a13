//! Background region generation on a fixed thread pool.
//!
//! Workers pull region requests from a bounded queue, run them through the
//! shared [`RegionCache`] (so a region requested here and by a direct
//! `find_or_create` call is still generated only once), and report finished
//! regions over a bounded result channel.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use crossbeam_channel::{Receiver, Sender, bounded};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use glam::IVec2;

use crate::error::MapGenError;
use crate::pipeline::{RegionCache, RegionMaps, region_base};

/// A request to generate one region.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RegionTask {
    /// Any world point inside the region; normalized to the region base on submit.
    pub basepos: IVec2,
    /// Lower values should be generated first. Typically the squared region
    /// distance from the viewer; the queue itself is FIFO, so callers submit
    /// in priority order.
    pub priority: u64,
}

/// A finished region.
#[derive(Debug)]
pub struct GeneratedRegion {
    /// Base position of the region.
    pub basepos: IVec2,
    pub result: Result<Arc<RegionMaps>, MapGenError>,
    /// Time spent in the worker, in microseconds. Near zero when the region
    /// was already cached.
    pub generation_time_us: u64,
}

struct QueuedTask {
    basepos: IVec2,
    cancelled: Arc<AtomicBool>,
}

/// A worker's report, tagged with the flag of the submission it answers.
struct Finished {
    region: GeneratedRegion,
    cancelled: Arc<AtomicBool>,
}

/// Generates regions into a shared cache on background threads.
pub struct AsyncRegionGenerator {
    task_sender: Sender<QueuedTask>,
    result_receiver: Receiver<Finished>,
    /// Cancellation flag per pending region base.
    active_tasks: Arc<DashMap<IVec2, Arc<AtomicBool>>>,
    in_flight: Arc<AtomicU64>,
    cache: Arc<RegionCache>,
}

impl AsyncRegionGenerator {
    /// Spawns `thread_count` workers feeding `cache`.
    ///
    /// - `max_concurrent`: queue depth is twice this; further submissions are rejected.
    /// - `result_capacity`: bound of the result channel. Workers block when it is
    ///   full, so drain it regularly.
    pub fn new(
        cache: Arc<RegionCache>,
        thread_count: usize,
        max_concurrent: usize,
        result_capacity: usize,
    ) -> std::io::Result<Self> {
        let (task_sender, task_receiver) = bounded::<QueuedTask>(max_concurrent.max(1) * 2);
        let (result_sender, result_receiver) = bounded::<Finished>(result_capacity.max(1));
        let in_flight = Arc::new(AtomicU64::new(0));

        for index in 0..thread_count.max(1) {
            let receiver = task_receiver.clone();
            let sender = result_sender.clone();
            let in_flight = Arc::clone(&in_flight);
            let cache = Arc::clone(&cache);

            std::thread::Builder::new()
                .name(format!("region-gen-{index}"))
                .spawn(move || {
                    while let Ok(task) = receiver.recv() {
                        if task.cancelled.load(Ordering::Relaxed) {
                            in_flight.fetch_sub(1, Ordering::Relaxed);
                            continue;
                        }

                        let start = std::time::Instant::now();
                        let result = cache.find_or_create(task.basepos.x, task.basepos.y);
                        let elapsed = start.elapsed().as_micros() as u64;

                        if let Err(err) = &result {
                            log::error!("region {} failed: {err}", task.basepos);
                        }

                        if !task.cancelled.load(Ordering::Relaxed) {
                            let _ = sender.send(Finished {
                                region: GeneratedRegion {
                                    basepos: task.basepos,
                                    result,
                                    generation_time_us: elapsed,
                                },
                                cancelled: task.cancelled,
                            });
                        }

                        in_flight.fetch_sub(1, Ordering::Relaxed);
                    }
                })?;
        }

        Ok(Self {
            task_sender,
            result_receiver,
            active_tasks: Arc::new(DashMap::new()),
            in_flight,
            cache,
        })
    }

    /// Generator sized to the machine: all cores but two (at least one).
    pub fn with_defaults(cache: Arc<RegionCache>) -> std::io::Result<Self> {
        let cpus = num_cpus::get().max(2);
        Self::new(cache, (cpus - 2).max(1), 64, 128)
    }

    /// The cache workers generate into.
    pub fn cache(&self) -> &Arc<RegionCache> {
        &self.cache
    }

    /// Queues a region for generation.
    ///
    /// Returns `Err(task)` if the queue is full or the region is already pending.
    pub fn submit(&self, task: RegionTask) -> Result<(), RegionTask> {
        let basepos = region_base(task.basepos.x, task.basepos.y);
        let cancelled = Arc::new(AtomicBool::new(false));

        match self.active_tasks.entry(basepos) {
            Entry::Occupied(_) => return Err(task),
            Entry::Vacant(slot) => {
                slot.insert(Arc::clone(&cancelled));
            }
        }
        self.in_flight.fetch_add(1, Ordering::Relaxed);

        self.task_sender
            .try_send(QueuedTask { basepos, cancelled })
            .map_err(|_| {
                self.in_flight.fetch_sub(1, Ordering::Relaxed);
                self.active_tasks.remove(&basepos);
                task
            })
    }

    /// Cancels a pending region. A region already being generated still
    /// lands in the cache, but no result is reported for it.
    pub fn cancel(&self, basepos: IVec2) {
        let basepos = region_base(basepos.x, basepos.y);
        if let Some((_, cancelled)) = self.active_tasks.remove(&basepos) {
            cancelled.store(true, Ordering::Relaxed);
        }
    }

    /// Collects every finished region without blocking.
    ///
    /// Reports from cancelled submissions are dropped, and a report only
    /// clears the pending entry of the submission it belongs to, so a region
    /// resubmitted after a cancel stays pending until its own result arrives.
    pub fn drain_results(&self) -> Vec<GeneratedRegion> {
        let mut results = Vec::new();
        while let Ok(finished) = self.result_receiver.try_recv() {
            let Finished { region, cancelled } = finished;
            self.active_tasks
                .remove_if(&region.basepos, |_, flag| Arc::ptr_eq(flag, &cancelled));
            if cancelled.load(Ordering::Relaxed) {
                log::debug!("dropping result of cancelled region {}", region.basepos);
                continue;
            }
            results.push(region);
        }
        results
    }

    /// Number of tasks queued or executing.
    pub fn in_flight_count(&self) -> u64 {
        self.in_flight.load(Ordering::Relaxed)
    }

    /// Returns `true` if the region containing `basepos` is queued or executing.
    pub fn is_pending(&self, basepos: IVec2) -> bool {
        self.active_tasks
            .contains_key(&region_base(basepos.x, basepos.y))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::{MapGenParams, REGION_SPAN};
    use std::time::{Duration, Instant};

    fn task(rx: i32, rz: i32) -> RegionTask {
        RegionTask {
            basepos: IVec2::new(rx * REGION_SPAN, rz * REGION_SPAN),
            priority: (rx * rx + rz * rz) as u64,
        }
    }

    fn collect(generator: &AsyncRegionGenerator, expected: usize) -> Vec<GeneratedRegion> {
        let mut results = Vec::new();
        let deadline = Instant::now() + Duration::from_secs(60);
        while results.len() < expected && Instant::now() < deadline {
            results.extend(generator.drain_results());
            if results.len() < expected {
                std::thread::sleep(Duration::from_millis(10));
            }
        }
        results
    }

    #[test]
    fn test_all_submitted_regions_are_delivered() {
        let cache = Arc::new(RegionCache::new(MapGenParams::default()));
        let generator = AsyncRegionGenerator::new(Arc::clone(&cache), 4, 16, 16).unwrap();

        let mut submitted = 0;
        for rx in -1..2 {
            for rz in -1..1 {
                if generator.submit(task(rx, rz)).is_ok() {
                    submitted += 1;
                }
            }
        }

        let results = collect(&generator, submitted);
        assert_eq!(results.len(), submitted, "got {}/{submitted}", results.len());
        for region in &results {
            let maps = region.result.as_ref().unwrap();
            assert_eq!(maps.basepos, region.basepos);
            assert!(cache.contains(region.basepos));
        }
    }

    #[test]
    fn test_results_match_synchronous_generation() {
        let cache = Arc::new(RegionCache::default());
        let generator = AsyncRegionGenerator::new(Arc::clone(&cache), 2, 8, 8).unwrap();
        generator.submit(task(2, -3)).unwrap();
        let results = collect(&generator, 1);
        assert_eq!(results.len(), 1);

        let expected = crate::pipeline::generate_region(
            IVec2::new(2 * REGION_SPAN, -3 * REGION_SPAN),
            &MapGenParams::default(),
            None,
        )
        .unwrap();
        assert_eq!(**results[0].result.as_ref().unwrap(), expected);
    }

    #[test]
    fn test_submit_normalizes_and_rejects_duplicates() {
        let cache = Arc::new(RegionCache::default());
        let generator = AsyncRegionGenerator::new(cache, 1, 8, 8).unwrap();

        let inside = RegionTask {
            basepos: IVec2::new(-5, 7),
            priority: 0,
        };
        generator.submit(inside).unwrap();
        assert!(generator.is_pending(IVec2::new(-4096, 0)));
        assert!(generator.is_pending(IVec2::new(-1, 4095)));

        let same_region = RegionTask {
            basepos: IVec2::new(-4000, 100),
            priority: 0,
        };
        // Pending until drained, even if a worker already finished it.
        assert_eq!(generator.submit(same_region), Err(same_region));

        let results = collect(&generator, 1);
        assert_eq!(results[0].basepos, IVec2::new(-4096, 0));
    }

    #[test]
    fn test_cancel_clears_pending() {
        let cache = Arc::new(RegionCache::default());
        let generator = AsyncRegionGenerator::new(cache, 1, 8, 8).unwrap();
        let t = task(9, 9);
        generator.submit(t).unwrap();
        generator.cancel(t.basepos);
        assert!(!generator.is_pending(t.basepos));

        let mut results = Vec::new();
        let deadline = Instant::now() + Duration::from_secs(60);
        while generator.in_flight_count() > 0 && Instant::now() < deadline {
            results.extend(generator.drain_results());
            std::thread::sleep(Duration::from_millis(10));
        }
        results.extend(generator.drain_results());

        assert_eq!(generator.in_flight_count(), 0);
        assert!(!generator.is_pending(t.basepos));
        assert!(
            results.iter().all(|region| region.basepos != t.basepos),
            "cancelled region was reported"
        );
    }

    #[test]
    fn test_stale_result_keeps_resubmission_pending() {
        let cache = Arc::new(RegionCache::default());
        let generator = AsyncRegionGenerator::new(Arc::clone(&cache), 1, 8, 8).unwrap();
        let r = task(4, 4);
        generator.submit(r).unwrap();

        // Let the first submission finish without draining its report.
        let deadline = Instant::now() + Duration::from_secs(60);
        while generator.in_flight_count() > 0 && Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(10));
        }
        assert_eq!(generator.in_flight_count(), 0);

        generator.cancel(r.basepos);
        // Keep the single worker busy so the resubmission queues behind it.
        generator.submit(task(-4, -4)).unwrap();
        generator.submit(r).unwrap();

        let first = generator.drain_results();
        let delivered = first.iter().any(|region| region.basepos == r.basepos);
        assert_eq!(
            generator.is_pending(r.basepos),
            !delivered,
            "stale report cleared the resubmitted region"
        );

        let mut results = first;
        let deadline = Instant::now() + Duration::from_secs(60);
        while generator.in_flight_count() > 0 && Instant::now() < deadline {
            results.extend(generator.drain_results());
            std::thread::sleep(Duration::from_millis(10));
        }
        results.extend(generator.drain_results());

        let reports = results.iter().filter(|region| region.basepos == r.basepos).count();
        assert_eq!(reports, 1, "expected exactly the resubmission's report");
        assert!(!generator.is_pending(r.basepos));
    }

    #[test]
    fn test_in_flight_count_drains_to_zero() {
        let cache = Arc::new(RegionCache::default());
        let generator = AsyncRegionGenerator::new(cache, 1, 8, 8).unwrap();
        assert_eq!(generator.in_flight_count(), 0);

        for rx in 0..3 {
            let _ = generator.submit(task(rx, 0));
        }
        assert!(generator.in_flight_count() > 0);

        let deadline = Instant::now() + Duration::from_secs(60);
        while generator.in_flight_count() > 0 && Instant::now() < deadline {
            let _ = generator.drain_results();
            std::thread::sleep(Duration::from_millis(10));
        }
        assert_eq!(generator.in_flight_count(), 0);
    }
}
