//! # Seed Job Applier
//!
//! Translates declared seed job descriptors into groovy that defines job DSL
//! seed jobs inside the instance.
//!
//! Idempotency: the descriptor `id` is the Jenkins job name, the script looks
//! the job up before creating it, and every mutable attribute is rewritten in
//! place. Re-applying the same descriptor updates the existing job, never
//! creates a duplicate, and never resets its build history. Each application
//! ends by scheduling one build so DSL targets become buildable jobs without
//! manual intervention.

use crate::configuration::user::groovy::{quote, quote_or_null};
use crate::crd::{JenkinsCredentialType, SeedJob};

/// Render the groovy script that creates or updates one seed job
pub fn seed_job_script(seed_job: &SeedJob) -> String {
    let job_name = quote(&seed_job.id);
    let description = quote(seed_job.description.as_deref().unwrap_or_default());
    let repository_url = quote(&seed_job.repository_url);
    let branch_spec = quote(&format!("*/{}", seed_job.repository_branch));
    let credential_id = match seed_job.credential_type {
        JenkinsCredentialType::NoCredential => "null".to_string(),
        _ => quote_or_null(seed_job.credential_id.as_deref()),
    };
    let targets = quote(&seed_job.targets);

    let mut script = format!(
        r"import jenkins.model.Jenkins

def jenkins = Jenkins.get()
def jobName = {job_name}
def job = jenkins.getItem(jobName)
if (job == null) {{
    job = jenkins.createProject(hudson.model.FreeStyleProject, jobName)
}}
job.setDescription({description})

def remote = new hudson.plugins.git.UserRemoteConfig({repository_url}, jobName, null, {credential_id})
job.setScm(new hudson.plugins.git.GitSCM([remote], [new hudson.plugins.git.BranchSpec({branch_spec})], null, null, []))

job.getBuildersList().clear()
def dsl = new javaposse.jobdsl.plugin.ExecuteDslScripts()
dsl.setTargets({targets})
dsl.setUseScriptText(false)
dsl.setIgnoreMissingFiles({ignore_missing_files})
dsl.setFailOnMissingPlugin({fail_on_missing_plugin})
dsl.setUnstableOnDeprecation({unstable_on_deprecation})
dsl.setRemovedJobAction(javaposse.jobdsl.plugin.RemovedJobAction.IGNORE)
dsl.setLookupStrategy(javaposse.jobdsl.plugin.LookupStrategy.JENKINS_ROOT)
",
        ignore_missing_files = seed_job.ignore_missing_files,
        fail_on_missing_plugin = seed_job.fail_on_missing_plugin,
        unstable_on_deprecation = seed_job.unstable_on_deprecation,
    );

    if let Some(classpath) = seed_job
        .additional_classpath
        .as_deref()
        .filter(|c| !c.is_empty())
    {
        script.push_str(&format!(
            "dsl.setAdditionalClasspath({})\n",
            quote(classpath)
        ));
    }

    script.push_str(
        r"job.getBuildersList().add(dsl)

new ArrayList(job.getTriggers().values()).each { trigger ->
    job.removeTrigger(trigger.getDescriptor())
}
",
    );

    if let Some(poll_scm) = seed_job.poll_scm.as_deref().filter(|s| !s.is_empty()) {
        script.push_str(&format!(
            "job.addTrigger(new hudson.triggers.SCMTrigger({}))\n",
            quote(poll_scm)
        ));
    }
    if let Some(build_periodically) = seed_job
        .build_periodically
        .as_deref()
        .filter(|s| !s.is_empty())
    {
        script.push_str(&format!(
            "job.addTrigger(new hudson.triggers.TimerTrigger({}))\n",
            quote(build_periodically)
        ));
    }
    if seed_job.github_push_trigger {
        script.push_str("job.addTrigger(new com.cloudbees.jenkins.GitHubPushTrigger())\n");
    }

    script.push_str(
        r"job.save()
jenkins.getQueue().schedule(job, 0)
println 'seed job ' + jobName + ' configured'
",
    );

    script
}
