//! # Seed Job Applier Unit Tests
//!
//! Tests for the groovy rendered from seed job descriptors.
//!
//! These tests verify:
//! - The descriptor id is the Jenkins job name and the script updates in place
//! - Flags and triggers render only when declared
//! - Credential handling per credential type
//! - Deterministic rendering

use jenkins_operator::configuration::user::seed_jobs::seed_job_script;
use jenkins_operator::crd::{JenkinsCredentialType, SeedJob};

fn minimal_seed_job() -> SeedJob {
    SeedJob {
        id: "jenkins-operator-e2e".to_string(),
        repository_url: "https://github.com/example/jobs.git".to_string(),
        repository_branch: "master".to_string(),
        targets: "cicd/jobs/*.jenkins".to_string(),
        ..SeedJob::default()
    }
}

#[test]
fn test_seed_job_script_uses_id_as_job_name() {
    let script = seed_job_script(&minimal_seed_job());
    assert!(script.contains("def jobName = 'jenkins-operator-e2e'"));
}

#[test]
fn test_seed_job_script_looks_up_before_creating() {
    let script = seed_job_script(&minimal_seed_job());
    let lookup = script
        .find("jenkins.getItem(jobName)")
        .expect("script looks the job up");
    let create = script
        .find("jenkins.createProject(hudson.model.FreeStyleProject, jobName)")
        .expect("script creates the job when absent");
    assert!(lookup < create, "lookup must come before creation");
    assert!(script.contains("if (job == null)"));
}

#[test]
fn test_seed_job_script_rewrites_mutable_attributes() {
    let script = seed_job_script(&minimal_seed_job());
    // Builders and triggers are cleared and re-declared so re-application
    // converges instead of accumulating
    assert!(script.contains("job.getBuildersList().clear()"));
    assert!(script.contains("job.removeTrigger(trigger.getDescriptor())"));
    assert!(script.contains("job.setScm("));
    assert!(script.contains("job.save()"));
}

#[test]
fn test_seed_job_script_schedules_a_build() {
    let script = seed_job_script(&minimal_seed_job());
    assert!(script.contains("jenkins.getQueue().schedule(job, 0)"));
}

#[test]
fn test_seed_job_script_repository_settings() {
    let mut seed_job = minimal_seed_job();
    seed_job.repository_branch = "release/1.x".to_string();
    let script = seed_job_script(&seed_job);
    assert!(script.contains("'https://github.com/example/jobs.git'"));
    assert!(script.contains("new hudson.plugins.git.BranchSpec('*/release/1.x')"));
}

#[test]
fn test_seed_job_script_without_credentials_passes_null() {
    let script = seed_job_script(&minimal_seed_job());
    assert!(script.contains("jobName, null, null)"));
}

#[test]
fn test_seed_job_script_with_credential_id() {
    let mut seed_job = minimal_seed_job();
    seed_job.credential_type = JenkinsCredentialType::UsernamePassword;
    seed_job.credential_id = Some("github-token".to_string());
    let script = seed_job_script(&seed_job);
    assert!(script.contains("jobName, null, 'github-token')"));
}

#[test]
fn test_seed_job_script_triggers_render_only_when_declared() {
    let script = seed_job_script(&minimal_seed_job());
    assert!(!script.contains("SCMTrigger"));
    assert!(!script.contains("TimerTrigger"));
    assert!(!script.contains("GitHubPushTrigger"));

    let mut seed_job = minimal_seed_job();
    seed_job.poll_scm = Some("H/5 * * * *".to_string());
    seed_job.build_periodically = Some("@daily".to_string());
    seed_job.github_push_trigger = true;
    let script = seed_job_script(&seed_job);
    assert!(script.contains("new hudson.triggers.SCMTrigger('H/5 * * * *')"));
    assert!(script.contains("new hudson.triggers.TimerTrigger('@daily')"));
    assert!(script.contains("new com.cloudbees.jenkins.GitHubPushTrigger()"));
}

#[test]
fn test_seed_job_script_dsl_flags() {
    let mut seed_job = minimal_seed_job();
    seed_job.fail_on_missing_plugin = true;
    seed_job.ignore_missing_files = true;
    let script = seed_job_script(&seed_job);
    assert!(script.contains("dsl.setTargets('cicd/jobs/*.jenkins')"));
    assert!(script.contains("dsl.setFailOnMissingPlugin(true)"));
    assert!(script.contains("dsl.setIgnoreMissingFiles(true)"));
    assert!(script.contains("dsl.setUnstableOnDeprecation(false)"));
}

#[test]
fn test_seed_job_script_additional_classpath_only_when_set() {
    let script = seed_job_script(&minimal_seed_job());
    assert!(!script.contains("setAdditionalClasspath"));

    let mut seed_job = minimal_seed_job();
    seed_job.additional_classpath = Some("src/main/groovy".to_string());
    let script = seed_job_script(&seed_job);
    assert!(script.contains("dsl.setAdditionalClasspath('src/main/groovy')"));
}

#[test]
fn test_seed_job_script_is_deterministic() {
    let seed_job = minimal_seed_job();
    assert_eq!(seed_job_script(&seed_job), seed_job_script(&seed_job));
}

#[test]
fn test_seed_job_script_escapes_quotes_in_description() {
    let mut seed_job = minimal_seed_job();
    seed_job.description = Some("operator's seed job".to_string());
    let script = seed_job_script(&seed_job);
    assert!(script.contains(r"job.setDescription('operator\'s seed job')"));
}
