//! Host bootstrap and remote deploy scripts
//!
//! `user_data.sh` is rendered through Terraform's `templatefile`, so it
//! must not contain `${` except for the `app_port` template variable.

use crate::domain::entities::ApplicationProfile;
use crate::domain::value_objects::Language;

/// Directory the application lives in on a provisioned host
pub const APP_DIR: &str = "/opt/app";
pub const SERVICE_NAME: &str = "autodeploy-app";
const START_WRAPPER: &str = ".autodeploy-start.sh";

/// Written as the last step of every first-boot script; hosts are ready
/// for setup once it exists
pub const BOOTSTRAP_MARKER: &str = "/var/lib/autodeploy/bootstrap-complete";

/// Where the staged repository is copied before it is moved into place
pub fn remote_staging_dir(deployment_id: &str) -> String {
    format!("/tmp/app-{}", deployment_id)
}

/// Remote path of the uploaded deploy script
pub fn remote_script_path(deployment_id: &str) -> String {
    format!("/tmp/deploy-{}.sh", deployment_id)
}

/// First-boot script for AWS instances
pub fn user_data(profile: &ApplicationProfile) -> String {
    let mut script = String::from(
        "#!/bin/bash
set -e

apt-get update -y
apt-get upgrade -y
apt-get install -y git curl wget unzip

",
    );
    match profile.language {
        Language::Python => script.push_str(
            "apt-get install -y python3 python3-pip python3-venv python-is-python3
",
        ),
        lang if lang.is_node() => script.push_str(
            "curl -fsSL https://deb.nodesource.com/setup_18.x | bash -
apt-get install -y nodejs
",
        ),
        _ => {}
    }
    script.push_str(
        "
mkdir -p /opt/app
echo \"APP_PORT=${app_port}\" > /etc/autodeploy.env
",
    );
    script.push_str(&format!(
        "mkdir -p /var/lib/autodeploy
touch {marker}
echo \"bootstrap complete\"
",
        marker = BOOTSTRAP_MARKER
    ));
    script
}

/// Start command used when the profile has none
pub fn fallback_start_command(language: Language) -> &'static str {
    match language {
        Language::Python => "python app.py",
        lang if lang.is_node() => "npm start",
        _ => "echo 'No start command defined'",
    }
}

/// Script executed with `sudo bash` on the host after the repository
/// has been copied to [`remote_staging_dir`]
pub fn deploy_script(
    profile: &ApplicationProfile,
    deployment_id: &str,
    ssh_user: &str,
) -> String {
    let start = profile
        .start_command
        .as_deref()
        .unwrap_or_else(|| fallback_start_command(profile.language));
    let staging = remote_staging_dir(deployment_id);

    let mut script = format!(
        "#!/bin/bash
set -e

echo \"deploying {id}\"
",
        id = deployment_id
    );
    script.push_str(&installer_wait(profile.language));
    script.push_str(&format!(
        "
systemctl stop {service}.service 2>/dev/null || true
mkdir -p {app}
cp -a {staging}/. {app}/
rm -rf {staging}
chown -R {user}:{user} {app}
cd {app}
",
        service = SERVICE_NAME,
        app = APP_DIR,
        staging = staging,
        user = ssh_user,
    ));
    script.push_str(install_dependencies(profile.language));
    script.push_str(&format!(
        "
cat > {app}/{wrapper} <<'AUTODEPLOY_START'
#!/bin/bash
cd {app}
exec {start}
AUTODEPLOY_START
chmod 755 {app}/{wrapper}

cat > /etc/systemd/system/{service}.service <<'AUTODEPLOY_UNIT'
[Unit]
Description=AutoDeploy application
After=network.target

[Service]
Type=simple
User={user}
WorkingDirectory={app}
Environment=PORT={port}
ExecStart=/bin/bash {app}/{wrapper}
Restart=always
RestartSec=5

[Install]
WantedBy=multi-user.target
AUTODEPLOY_UNIT

systemctl daemon-reload
systemctl enable {service}.service
systemctl restart {service}.service

echo \"deployment complete\"
",
        app = APP_DIR,
        wrapper = START_WRAPPER,
        start = start,
        service = SERVICE_NAME,
        user = ssh_user,
        port = profile.port,
    ));
    script
}

/// Wait for the package installer the bootstrap script provides, then
/// install it directly if it never appeared
fn installer_wait(language: Language) -> String {
    let (installer, packages) = match language {
        Language::Python => ("pip3", "python3-pip python3-venv python-is-python3"),
        lang if lang.is_node() => ("npm", "nodejs npm"),
        _ => return String::new(),
    };
    format!(
        "
for _ in $(seq 1 30); do
  command -v {installer} >/dev/null 2>&1 && break
  sleep 10
done
if ! command -v {installer} >/dev/null 2>&1; then
  apt-get update -y
  apt-get install -y {packages}
fi
",
        installer = installer,
        packages = packages,
    )
}

fn install_dependencies(language: Language) -> &'static str {
    match language {
        Language::Python => {
            "
if [ -f requirements.txt ]; then
  pip3 install -r requirements.txt
fi
"
        }
        lang if lang.is_node() => {
            "
if [ -f package.json ]; then
  npm install --production
fi
"
        }
        _ => "",
    }
}
