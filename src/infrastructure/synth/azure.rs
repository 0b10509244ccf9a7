//! Azure templates; fixed shape regardless of compute type

use super::{fill, SynthContext};

pub(super) fn main(_: &SynthContext) -> String {
    r##"terraform {
  required_version = ">= 1.0"

  required_providers {
    azurerm = {
      source  = "hashicorp/azurerm"
      version = "~> 3.0"
    }
  }
}

provider "azurerm" {
  features {}
}

resource "azurerm_resource_group" "main" {
  name     = "${var.app_name}-rg"
  location = var.azure_location
}

resource "azurerm_virtual_network" "main" {
  name                = "${var.app_name}-vnet"
  address_space       = ["10.0.0.0/16"]
  location            = azurerm_resource_group.main.location
  resource_group_name = azurerm_resource_group.main.name
}

resource "azurerm_subnet" "main" {
  name                 = "${var.app_name}-subnet"
  resource_group_name  = azurerm_resource_group.main.name
  virtual_network_name = azurerm_virtual_network.main.name
  address_prefixes     = ["10.0.1.0/24"]
}
"##
    .to_string()
}

pub(super) fn variables(ctx: &SynthContext) -> String {
    fill(
        r##"variable "azure_location" {
  description = "Azure location to deploy into"
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
    "# No outputs defined\n".to_string()
}
