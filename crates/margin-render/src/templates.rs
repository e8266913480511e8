//! Template engine for rendering full post and index pages.

use minijinja::{context, Environment};
use serde::Serialize;

use crate::post::Post;

/// Site-wide values available to every page.
#[derive(Debug, Clone, Serialize)]
pub struct Site {
    /// Site title
    pub title: String,
    /// Base URL, ending in `/`
    pub base_url: String,
}

/// Template engine using minijinja.
pub struct TemplateEngine {
    env: Environment<'static>,
}

impl TemplateEngine {
    /// Create a new template engine with the built-in templates.
    pub fn new() -> Self {
        let mut env = Environment::new();

        env.add_template_owned("base.html".to_string(), BASE_TEMPLATE.to_string())
            .expect("Failed to add base template");

        env.add_template_owned("post.html".to_string(), POST_TEMPLATE.to_string())
            .expect("Failed to add post template");

        env.add_template_owned("index.html".to_string(), INDEX_TEMPLATE.to_string())
            .expect("Failed to add index template");

        Self { env }
    }

    /// Render a single post page.
    pub fn render_post(&self, post: &Post, site: &Site) -> Result<String, minijinja::Error> {
        let tmpl = self.env.get_template("post.html")?;

        tmpl.render(context! {
            title => &post.title,
            site => site,
            post => post,
        })
    }

    /// Render the index page listing `posts` in the given order.
    ///
    /// Private posts are left out.
    pub fn render_index(&self, posts: &[Post], site: &Site) -> Result<String, minijinja::Error> {
        let tmpl = self.env.get_template("index.html")?;
        let public: Vec<&Post> = posts.iter().filter(|p| !p.private).collect();

        tmpl.render(context! {
            title => &site.title,
            site => site,
            posts => public,
        })
    }
}

impl Default for TemplateEngine {
    fn default() -> Self {
        Self::new()
    }
}

const BASE_TEMPLATE: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <title>{% if title != site.title %}{{ title }} - {% endif %}{{ site.title }}</title>
  {% block meta %}{% endblock %}
  <link rel="stylesheet" href="{{ site.base_url }}assets/main.css">
</head>
<body>
  <nav class="site-nav">
    <a href="{{ site.base_url }}" class="site-title">{{ site.title }}</a>
  </nav>
  <main class="main">
    {% block content %}{% endblock %}
  </main>
</body>
</html>"##;

const POST_TEMPLATE: &str = r##"{% extends "base.html" %}

{% block meta %}{% if post.summary %}<meta name="description" content="{{ post.summary }}">{% endif %}
  {% if post.private %}<meta name="robots" content="noindex">{% endif %}{% endblock %}

{% block content %}
<article class="post">
  {{ post.content | safe }}
</article>

{% if post.toc %}
<aside class="toc">
  <h2>Contents</h2>
  <ul>
  {% for entry in post.toc.titles %}
    <li class="toc-level-{{ entry.level }}">
      <a href="#{{ entry.id }}">{{ entry.title }}</a>
    </li>
  {% endfor %}
  </ul>
</aside>
{% endif %}
{% endblock %}"##;

const INDEX_TEMPLATE: &str = r##"{% extends "base.html" %}

{% block content %}
<ul class="post-list">
{% for post in posts %}
  <li>
    {% if post.iso_date %}<time datetime="{{ post.iso_date }}">{{ post.iso_date }}</time>{% endif %}
    <a href="{{ site.base_url }}{{ post.path }}">{{ post.title }}</a>
    {% if post.summary %}<p>{{ post.summary }}</p>{% endif %}
  </li>
{% endfor %}
</ul>
{% endblock %}"##;
