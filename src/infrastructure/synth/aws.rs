//! AWS partials

use super::{fill, Partial, SynthContext};
use crate::domain::entities::{ComputeResources, DatabaseSpec};
use crate::domain::value_objects::DatabaseKind;

pub(super) const MAIN_PARTIALS: &[Partial] = &[
    Partial::always("provider", provider),
    Partial::always("network", network),
    Partial {
        name: "public_subnet_b",
        applies: has_load_balancer,
        render: public_subnet_b,
    },
    Partial {
        name: "private_subnet",
        applies: |ctx| ctx.plan.networking.private_subnet,
        render: private_subnet,
    },
    Partial::always("app_security_group", app_security_group),
    Partial {
        name: "vm_instance",
        applies: |ctx| ctx.plan.compute_resources.is_vm(),
        render: vm_instance,
    },
    Partial {
        name: "autoscaling",
        applies: |ctx| ctx.plan.compute_resources.is_autoscaling_vm(),
        render: autoscaling,
    },
    Partial {
        name: "database",
        applies: |ctx| ctx.plan.database.required(),
        render: database,
    },
    Partial {
        name: "load_balancer",
        applies: has_load_balancer,
        render: load_balancer,
    },
    Partial {
        name: "load_balancer_attachment",
        applies: |ctx| has_load_balancer(ctx) && ctx.plan.compute_resources.is_vm(),
        render: load_balancer_attachment,
    },
    Partial {
        name: "object_storage",
        applies: |ctx| ctx.plan.storage.object_storage,
        render: object_storage,
    },
];

pub(super) const OUTPUT_PARTIALS: &[Partial] = &[
    Partial {
        name: "load_balancer_dns",
        applies: has_load_balancer,
        render: |_| {
            r##"output "load_balancer_dns" {
  description = "Public DNS name of the load balancer"
  value       = aws_lb.app.dns_name
}"##
            .to_string()
        },
    },
    Partial {
        name: "instance_public_ip",
        applies: |ctx| ctx.plan.compute_resources.is_vm(),
        render: |_| {
            r##"output "instance_public_ip" {
  description = "Public IP of the application instance"
  value       = aws_instance.app.public_ip
}"##
            .to_string()
        },
    },
    Partial {
        name: "database",
        applies: |ctx| ctx.plan.database.required(),
        render: database_outputs,
    },
];

fn has_load_balancer(ctx: &SynthContext) -> bool {
    ctx.plan.networking.load_balancer
}

fn app_port(ctx: &SynthContext) -> String {
    ctx.profile.port.to_string()
}

fn provider(_: &SynthContext) -> String {
    r##"terraform {
  required_version = ">= 1.0"

  required_providers {
    aws = {
      source  = "hashicorp/aws"
      version = "~> 5.0"
    }
  }
}

provider "aws" {
  region = var.aws_region
}

data "aws_availability_zones" "available" {
  state = "available"
}"##
    .to_string()
}

fn network(_: &SynthContext) -> String {
    r##"resource "aws_vpc" "main" {
  cidr_block           = "10.0.0.0/16"
  enable_dns_hostnames = true
  enable_dns_support   = true

  tags = {
    Name = "${var.app_name}-vpc"
  }
}

resource "aws_internet_gateway" "main" {
  vpc_id = aws_vpc.main.id

  tags = {
    Name = "${var.app_name}-igw"
  }
}

resource "aws_subnet" "public" {
  vpc_id                  = aws_vpc.main.id
  cidr_block              = "10.0.1.0/24"
  availability_zone       = data.aws_availability_zones.available.names[0]
  map_public_ip_on_launch = true

  tags = {
    Name = "${var.app_name}-public"
  }
}

resource "aws_route_table" "public" {
  vpc_id = aws_vpc.main.id

  route {
    cidr_block = "0.0.0.0/0"
    gateway_id = aws_internet_gateway.main.id
  }

  tags = {
    Name = "${var.app_name}-public-rt"
  }
}

resource "aws_route_table_association" "public" {
  subnet_id      = aws_subnet.public.id
  route_table_id = aws_route_table.public.id
}"##
    .to_string()
}

fn public_subnet_b(_: &SynthContext) -> String {
    r##"resource "aws_subnet" "public_b" {
  vpc_id                  = aws_vpc.main.id
  cidr_block              = "10.0.3.0/24"
  availability_zone       = data.aws_availability_zones.available.names[1]
  map_public_ip_on_launch = true

  tags = {
    Name = "${var.app_name}-public-b"
  }
}

resource "aws_route_table_association" "public_b" {
  subnet_id      = aws_subnet.public_b.id
  route_table_id = aws_route_table.public.id
}"##
    .to_string()
}

fn private_subnet(_: &SynthContext) -> String {
    r##"resource "aws_subnet" "private" {
  vpc_id            = aws_vpc.main.id
  cidr_block        = "10.0.2.0/24"
  availability_zone = data.aws_availability_zones.available.names[1]

  tags = {
    Name = "${var.app_name}-private"
  }
}"##
    .to_string()
}

fn app_security_group(ctx: &SynthContext) -> String {
    fill(
        r##"resource "aws_security_group" "app" {
  name        = "${var.app_name}-app-sg"
  description = "Application traffic"
  vpc_id      = aws_vpc.main.id

  ingress {
    description = "Application port"
    from_port   = {{port}}
    to_port     = {{port}}
    protocol    = "tcp"
    cidr_blocks = ["0.0.0.0/0"]
  }

  ingress {
    description = "HTTP"
    from_port   = 80
    to_port     = 80
    protocol    = "tcp"
    cidr_blocks = ["0.0.0.0/0"]
  }

  ingress {
    description = "HTTPS"
    from_port   = 443
    to_port     = 443
    protocol    = "tcp"
    cidr_blocks = ["0.0.0.0/0"]
  }

  ingress {
    description = "SSH"
    from_port   = 22
    to_port     = 22
    protocol    = "tcp"
    cidr_blocks = ["0.0.0.0/0"]
  }

  egress {
    from_port   = 0
    to_port     = 0
    protocol    = "-1"
    cidr_blocks = ["0.0.0.0/0"]
  }
}"##,
        &[("port", &app_port(ctx))],
    )
}

fn vm_settings(ctx: &SynthContext) -> (String, String) {
    match &ctx.plan.compute_resources {
        ComputeResources::Vm {
            instance_type,
            disk_size_gb,
            ..
        } => (instance_type.clone(), disk_size_gb.to_string()),
        _ => ("t2.micro".to_string(), "20".to_string()),
    }
}

fn vm_instance(ctx: &SynthContext) -> String {
    let (instance_type, disk) = vm_settings(ctx);
    fill(
        r##"data "aws_ami" "ubuntu" {
  most_recent = true
  owners      = ["099720109477"]

  filter {
    name   = "name"
    values = ["ubuntu/images/hvm-ssd/ubuntu-jammy-22.04-amd64-server-*"]
  }

  filter {
    name   = "virtualization-type"
    values = ["hvm"]
  }
}

resource "aws_key_pair" "deployer" {
  key_name   = "${var.app_name}-key"
  public_key = var.ssh_public_key
}

resource "aws_instance" "app" {
  ami                    = data.aws_ami.ubuntu.id
  instance_type          = "{{instance_type}}"
  subnet_id              = aws_subnet.public.id
  vpc_security_group_ids = [aws_security_group.app.id]
  key_name               = aws_key_pair.deployer.key_name

  root_block_device {
    volume_size = {{disk}}
    volume_type = "gp3"
  }

  user_data = base64encode(templatefile("${path.module}/user_data.sh", {
    app_port = {{port}}
  }))

  tags = {
    Name = "${var.app_name}-instance"
  }
}"##,
        &[
            ("instance_type", &instance_type),
            ("disk", &disk),
            ("port", &app_port(ctx)),
        ],
    )
}

fn autoscaling(ctx: &SynthContext) -> String {
    let (instance_type, _) = vm_settings(ctx);
    let (min, max) = match &ctx.plan.compute_resources {
        ComputeResources::Vm {
            count, max_count, ..
        } => (*count, *max_count),
        _ => (1, 1),
    };
    let subnets = if has_load_balancer(ctx) {
        "aws_subnet.public.id, aws_subnet.public_b.id"
    } else {
        "aws_subnet.public.id"
    };
    let target_groups = if has_load_balancer(ctx) {
        "\n  target_group_arns   = [aws_lb_target_group.app.arn]"
    } else {
        ""
    };
    fill(
        r##"resource "aws_launch_template" "app" {
  name_prefix            = "${var.app_name}-lt-"
  image_id               = data.aws_ami.ubuntu.id
  instance_type          = "{{instance_type}}"
  key_name               = aws_key_pair.deployer.key_name
  vpc_security_group_ids = [aws_security_group.app.id]

  user_data = base64encode(templatefile("${path.module}/user_data.sh", {
    app_port = {{port}}
  }))
}

resource "aws_autoscaling_group" "app" {
  name                = "${var.app_name}-asg"
  min_size            = {{min}}
  max_size            = {{max}}
  desired_capacity    = {{min}}
  vpc_zone_identifier = [{{subnets}}]{{target_groups}}

  launch_template {
    id      = aws_launch_template.app.id
    version = "$Latest"
  }

  tag {
    key                 = "Name"
    value               = "${var.app_name}-asg-instance"
    propagate_at_launch = true
  }
}"##,
        &[
            ("instance_type", &instance_type),
            ("port", &app_port(ctx)),
            ("min", &min.to_string()),
            ("max", &max.to_string()),
            ("subnets", subnets),
            ("target_groups", target_groups),
        ],
    )
}

fn database_subnets(ctx: &SynthContext) -> String {
    let mut subnets = vec!["aws_subnet.public.id"];
    if ctx.plan.networking.private_subnet {
        subnets.push("aws_subnet.private.id");
    }
    if has_load_balancer(ctx) {
        subnets.push("aws_subnet.public_b.id");
    }
    subnets.join(", ")
}

fn database(ctx: &SynthContext) -> String {
    let Some(spec) = ctx.plan.database.spec() else {
        return String::new();
    };
    let security_group = fill(
        r##"resource "aws_security_group" "database" {
  name        = "${var.app_name}-db-sg"
  description = "Database access from the application"
  vpc_id      = aws_vpc.main.id

  ingress {
    from_port       = {{db_port}}
    to_port         = {{db_port}}
    protocol        = "tcp"
    security_groups = [aws_security_group.app.id]
  }

  egress {
    from_port   = 0
    to_port     = 0
    protocol    = "-1"
    cidr_blocks = ["0.0.0.0/0"]
  }
}"##,
        &[("db_port", &spec.engine.port().to_string())],
    );
    let store = if spec.engine == DatabaseKind::Mongodb {
        document_cluster(ctx, spec)
    } else {
        relational_instance(ctx, spec)
    };
    format!("{}\n\n{}", security_group, store)
}

fn relational_instance(ctx: &SynthContext, spec: &DatabaseSpec) -> String {
    fill(
        r##"resource "aws_db_subnet_group" "main" {
  name       = "${var.app_name}-db-subnets"
  subnet_ids = [{{subnets}}]

  tags = {
    Name = "${var.app_name}-db-subnets"
  }
}

resource "aws_db_instance" "main" {
  identifier              = "${var.app_name}-db"
  engine                  = "{{engine}}"
  engine_version          = "{{version}}"
  instance_class          = "{{instance_class}}"
  allocated_storage       = {{storage}}
  db_name                 = var.db_name
  username                = var.db_username
  password                = var.db_password
  db_subnet_group_name    = aws_db_subnet_group.main.name
  vpc_security_group_ids  = [aws_security_group.database.id]
  backup_retention_period = {{backups}}
  multi_az                = {{multi_az}}
  publicly_accessible     = false
  skip_final_snapshot     = true
}"##,
        &[
            ("subnets", &database_subnets(ctx)),
            ("engine", spec.engine.relational_engine()),
            ("version", &spec.version),
            ("instance_class", &spec.instance_class),
            ("storage", &spec.storage_gb.to_string()),
            ("backups", &spec.backup_retention_days.to_string()),
            ("multi_az", if spec.multi_az { "true" } else { "false" }),
        ],
    )
}

fn document_cluster(ctx: &SynthContext, spec: &DatabaseSpec) -> String {
    fill(
        r##"resource "aws_docdb_subnet_group" "main" {
  name       = "${var.app_name}-docdb-subnets"
  subnet_ids = [{{subnets}}]
}

resource "aws_docdb_cluster" "main" {
  cluster_identifier      = "${var.app_name}-docdb"
  engine                  = "docdb"
  master_username         = var.db_username
  master_password         = var.db_password
  db_subnet_group_name    = aws_docdb_subnet_group.main.name
  vpc_security_group_ids  = [aws_security_group.database.id]
  backup_retention_period = {{backups}}
  skip_final_snapshot     = true
}

resource "aws_docdb_cluster_instance" "main" {
  identifier         = "${var.app_name}-docdb-0"
  cluster_identifier = aws_docdb_cluster.main.id
  instance_class     = "db.t3.medium"
}"##,
        &[
            ("subnets", &database_subnets(ctx)),
            ("backups", &spec.backup_retention_days.to_string()),
        ],
    )
}

fn load_balancer(ctx: &SynthContext) -> String {
    let target_type = if ctx.plan.compute_resources.is_vm() {
        "instance"
    } else {
        "ip"
    };
    fill(
        r##"resource "aws_lb" "app" {
  name               = "${var.app_name}-alb"
  internal           = false
  load_balancer_type = "application"
  security_groups    = [aws_security_group.app.id]
  subnets            = [aws_subnet.public.id, aws_subnet.public_b.id]
}

resource "aws_lb_target_group" "app" {
  name        = "${var.app_name}-tg"
  port        = {{port}}
  protocol    = "HTTP"
  vpc_id      = aws_vpc.main.id
  target_type = "{{target_type}}"

  health_check {
    path                = "/"
    matcher             = "200-499"
    healthy_threshold   = 2
    unhealthy_threshold = 5
  }
}

resource "aws_lb_listener" "http" {
  load_balancer_arn = aws_lb.app.arn
  port              = 80
  protocol          = "HTTP"

  default_action {
    type             = "forward"
    target_group_arn = aws_lb_target_group.app.arn
  }
}"##,
        &[("port", &app_port(ctx)), ("target_type", target_type)],
    )
}

fn load_balancer_attachment(ctx: &SynthContext) -> String {
    fill(
        r##"resource "aws_lb_target_group_attachment" "app" {
  target_group_arn = aws_lb_target_group.app.arn
  target_id        = aws_instance.app.id
  port             = {{port}}
}"##,
        &[("port", &app_port(ctx))],
    )
}

fn object_storage(_: &SynthContext) -> String {
    r##"resource "aws_s3_bucket" "static" {
  bucket        = "${var.app_name}-static-files"
  force_destroy = true

  tags = {
    Name = "${var.app_name}-static-files"
  }
}"##
    .to_string()
}

fn database_outputs(ctx: &SynthContext) -> String {
    let mongodb = ctx
        .plan
        .database
        .spec()
        .is_some_and(|spec| spec.engine == DatabaseKind::Mongodb);
    let (endpoint, name) = if mongodb {
        ("aws_docdb_cluster.main.endpoint", "var.db_name")
    } else {
        ("aws_db_instance.main.endpoint", "aws_db_instance.main.db_name")
    };
    fill(
        r##"output "database_endpoint" {
  description = "Connection endpoint of the database"
  value       = {{endpoint}}
}

output "database_name" {
  description = "Logical database name"
  value       = {{name}}
}"##,
        &[("endpoint", endpoint), ("name", name)],
    )
}

pub(super) fn variables(ctx: &SynthContext) -> String {
    fill(
        r##"variable "aws_region" {
  description = "AWS region to deploy into"
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

variable "db_name" {
  description = "Logical database name"
  type        = string
  default     = "appdb"
}

variable "db_username" {
  description = "Database administrator user"
  type        = string
  default     = "appadmin"
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
