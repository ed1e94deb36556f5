//! Initialize a new Helios site

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

use crate::content::NewPost;
use crate::Helios;

const CONFIG: &str = r#"# Helios Configuration

# Site
title: Helios Blogs
subtitle: A minimalist blog platform for focused writing
description: ''
author: John Doe
language: en

# URL
url: http://example.com
root: /

# Directory
posts_dir: content/posts
pages_dir: content/pages
public_dir: public
# Read posts from a YAML catalog instead of posts_dir
# catalog: content/catalog.yml

# Writing
words_per_minute: 200
highlight:
  enable: true
  theme: InspiredGitHub

# Date format (strftime)
date_format: '%B %-d, %Y'

# Navigation
menu:
  - name: Home
    path: /
  - name: About
    path: /about/
  - name: Contact
    path: /contact/
  - name: Categories
    path: /categories/
  - name: Tags
    path: /tags/
"#;

const WELCOME: &str = r#"Welcome to Helios! This is your very first post.

<!-- more -->

## Quick Start

### Create a new post

```bash
$ helios new "My New Post" --tags "rust, writing"
```

### Run server

```bash
$ helios server
```

### Generate static files

```bash
$ helios generate
```
"#;

const ABOUT: &str = r#"---
title: About
description: About this blog
---

Helios is a minimalist blog platform for focused writing.
"#;

const CONTACT: &str = r#"---
title: Contact
description: Get in touch
---

Reach out at [hello@example.com](mailto:hello@example.com).
"#;

/// Initialize a new site in the given directory.
///
/// Existing files are left untouched.
pub fn init_site(target_dir: &Path) -> Result<()> {
    let posts_dir = target_dir.join("content/posts");
    let pages_dir = target_dir.join("content/pages");
    fs::create_dir_all(&posts_dir)
        .with_context(|| format!("Failed to create {:?}", posts_dir))?;
    fs::create_dir_all(&pages_dir)
        .with_context(|| format!("Failed to create {:?}", pages_dir))?;

    let mut sample = NewPost::new("Hello World");
    sample.description = "Your first Helios post".to_string();
    sample.tags = "welcome".to_string();
    sample.category = "General".to_string();
    sample.content = WELCOME.to_string();

    write_if_missing(&target_dir.join("_config.yml"), CONFIG)?;
    write_if_missing(&posts_dir.join(sample.file_name()), &sample.to_markdown())?;
    write_if_missing(&pages_dir.join("about.md"), ABOUT)?;
    write_if_missing(&pages_dir.join("contact.md"), CONTACT)?;

    Ok(())
}

fn write_if_missing(path: &Path, contents: &str) -> Result<()> {
    if path.exists() {
        tracing::warn!("Skipping existing file {:?}", path);
        return Ok(());
    }
    fs::write(path, contents).with_context(|| format!("Failed to write {:?}", path))?;
    tracing::debug!("Created {:?}", path);
    Ok(())
}

/// Run the init command with an existing Helios instance
pub fn run(helios: &Helios) -> Result<()> {
    init_site(&helios.base_dir)
}
