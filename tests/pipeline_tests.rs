//! # User Configuration Pipeline Tests
//!
//! Exercises the user configuration sequence against a fake script executor:
//! strict ordering (groovy, then configuration-as-code, then seed jobs),
//! empty-body skipping, and the first-failure gate that keeps the completion
//! milestone from being recorded after a partial pass.

use async_trait::async_trait;
use jenkins_operator::client::{JenkinsClientError, ScriptExecutor};
use jenkins_operator::configuration::user::{
    apply_user_configuration, customization_hash, ResolvedCustomization,
};
use jenkins_operator::crd::SeedJob;
use std::sync::Mutex;

/// Records every submitted script, optionally failing from a given call index
struct FakeExecutor {
    scripts: Mutex<Vec<String>>,
    fail_from_call: Option<usize>,
}

impl FakeExecutor {
    fn recording() -> Self {
        Self {
            scripts: Mutex::new(Vec::new()),
            fail_from_call: None,
        }
    }

    fn failing_from(call: usize) -> Self {
        Self {
            scripts: Mutex::new(Vec::new()),
            fail_from_call: Some(call),
        }
    }

    fn scripts(&self) -> Vec<String> {
        self.scripts.lock().unwrap().clone()
    }
}

#[async_trait]
impl ScriptExecutor for FakeExecutor {
    async fn execute_script(&self, script: &str) -> Result<String, JenkinsClientError> {
        let mut scripts = self.scripts.lock().unwrap();
        let call = scripts.len();
        scripts.push(script.to_string());
        if self.fail_from_call.is_some_and(|fail_from| call >= fail_from) {
            return Err(JenkinsClientError::GroovyScriptFailed {
                output: "groovy.lang.MissingPropertyException".to_string(),
            });
        }
        Ok(String::new())
    }
}

fn seed_job(id: &str) -> SeedJob {
    SeedJob {
        id: id.to_string(),
        repository_url: "https://github.com/example/jobs.git".to_string(),
        repository_branch: "master".to_string(),
        targets: "jobs/*.groovy".to_string(),
        ..SeedJob::default()
    }
}

fn full_customization() -> ResolvedCustomization {
    ResolvedCustomization {
        groovy_source: "println 'groovy customization'".to_string(),
        casc_source: "jenkins:\n  numExecutors: 2".to_string(),
    }
}

#[tokio::test]
async fn test_sequence_order_groovy_then_casc_then_seed_jobs() {
    let executor = FakeExecutor::recording();
    let seed_jobs = vec![seed_job("alpha"), seed_job("beta")];

    apply_user_configuration(&executor, &full_customization(), &seed_jobs)
        .await
        .unwrap();

    let scripts = executor.scripts();
    assert_eq!(scripts.len(), 4);
    assert_eq!(scripts[0], "println 'groovy customization'");
    assert!(scripts[1].contains("ConfigurationAsCode"));
    assert!(scripts[2].contains("'alpha'"));
    assert!(scripts[3].contains("'beta'"));
}

#[tokio::test]
async fn test_empty_bodies_are_skipped() {
    let executor = FakeExecutor::recording();
    let resolved = ResolvedCustomization {
        groovy_source: "   \n".to_string(),
        casc_source: String::new(),
    };

    apply_user_configuration(&executor, &resolved, &[seed_job("only")])
        .await
        .unwrap();

    let scripts = executor.scripts();
    assert_eq!(scripts.len(), 1);
    assert!(scripts[0].contains("'only'"));
}

#[tokio::test]
async fn test_nothing_declared_executes_nothing() {
    let executor = FakeExecutor::recording();
    apply_user_configuration(&executor, &ResolvedCustomization::default(), &[])
        .await
        .unwrap();
    assert!(executor.scripts().is_empty());
}

#[tokio::test]
async fn test_failure_stops_the_sequence() {
    // Groovy step fails; configuration-as-code and seed jobs must not run
    let executor = FakeExecutor::failing_from(0);
    let result =
        apply_user_configuration(&executor, &full_customization(), &[seed_job("never")]).await;

    assert!(matches!(
        result,
        Err(JenkinsClientError::GroovyScriptFailed { .. })
    ));
    assert_eq!(executor.scripts().len(), 1);
}

#[tokio::test]
async fn test_seed_job_failure_stops_remaining_seed_jobs() {
    // Calls: groovy, casc, then seed jobs; fail on the first seed job
    let executor = FakeExecutor::failing_from(2);
    let seed_jobs = vec![seed_job("first"), seed_job("second")];
    let result = apply_user_configuration(&executor, &full_customization(), &seed_jobs).await;

    assert!(result.is_err());
    let scripts = executor.scripts();
    assert_eq!(scripts.len(), 3);
    assert!(scripts[2].contains("'first'"));
}

#[test]
fn test_customization_hash_is_stable() {
    let resolved = full_customization();
    let seed_jobs = vec![seed_job("alpha")];
    assert_eq!(
        customization_hash(&resolved, &seed_jobs),
        customization_hash(&resolved, &seed_jobs)
    );
}

#[test]
fn test_customization_hash_changes_with_content() {
    let seed_jobs = vec![seed_job("alpha")];
    let base = customization_hash(&full_customization(), &seed_jobs);

    let mut groovy_changed = full_customization();
    groovy_changed.groovy_source.push_str("\nprintln 'more'");
    assert_ne!(base, customization_hash(&groovy_changed, &seed_jobs));

    let mut casc_changed = full_customization();
    casc_changed.casc_source = "jenkins:\n  numExecutors: 8".to_string();
    assert_ne!(base, customization_hash(&casc_changed, &seed_jobs));
}

#[test]
fn test_customization_hash_changes_with_seed_jobs() {
    let resolved = full_customization();
    let base = customization_hash(&resolved, &[seed_job("alpha")]);

    assert_ne!(
        base,
        customization_hash(&resolved, &[seed_job("alpha"), seed_job("beta")])
    );

    let mut retargeted = seed_job("alpha");
    retargeted.targets = "other/*.groovy".to_string();
    assert_ne!(base, customization_hash(&resolved, &[retargeted]));
}
