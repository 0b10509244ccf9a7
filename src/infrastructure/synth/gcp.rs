//! GCP templates; fixed shape regardless of compute type

use super::scripts::BOOTSTRAP_MARKER;
use super::{fill, SynthContext};

pub(super) fn main(ctx: &SynthContext) -> String {
    fill(
        r##"terraform {
  required_version = ">= 1.0"

  required_providers {
    google = {
      source  = "hashicorp/google"
      version = "~> 5.0"
    }
  }
}

provider "google" {
  project = var.gcp_project_id
  region  = var.gcp_region
}

resource "google_compute_instance" "app" {
  name         = "${var.app_name}-instance"
  machine_type = "e2-micro"
  zone         = "${var.gcp_region}-a"

  boot_disk {
    initialize_params {
      image = "ubuntu-os-cloud/ubuntu-2204-lts"
    }
  }

  network_interface {
    network = "default"
    access_config {}
  }

  metadata = {
    ssh-keys = "ubuntu:${var.ssh_public_key}"
  }

  metadata_startup_script = <<-EOT
    #!/bin/bash
    apt-get update -y
    apt-get install -y python3 python3-pip python3-venv git curl
    mkdir -p /opt/app /var/lib/autodeploy
    touch {{marker}}
  EOT

  tags = ["autodeploy-app"]
}

resource "google_compute_firewall" "app" {
  name    = "${var.app_name}-allow-web"
  network = "default"

  allow {
    protocol = "tcp"
    ports    = ["80", "443", "{{port}}"]
  }

  source_ranges = ["0.0.0.0/0"]
  target_tags   = ["autodeploy-app"]
}
"##,
        &[
            ("port", &ctx.profile.port.to_string()),
            ("marker", BOOTSTRAP_MARKER),
        ],
    )
}

pub(super) fn variables(ctx: &SynthContext) -> String {
    fill(
        r##"variable "gcp_project_id" {
  description = "GCP project to deploy into"
  type        = string
}

variable "gcp_region" {
  description = "GCP region to deploy into"
  type        = string
  default     = "{{region}}"
}

variable "app_name" {
  description = "Name prefix for every resource"
  type        = string
  default     = "autodeploy-app"
}

variable "ssh_public_key" {
  description = "Public key installed on application hosts"
  type        = string
  default     = ""
}

variable "db_password" {
  description = "Database administrator password"
  type        = string
  sensitive   = true
}
"##,
        &[("region", &ctx.plan.region)],
    )
}

pub(super) fn outputs(_: &SynthContext) -> String {
    r##"output "instance_public_ip" {
  description = "Public IP of the application instance"
  value       = google_compute_instance.app.network_interface[0].access_config[0].nat_ip
}
"##
    .to_string()
}
