//! Embeddable JavaScript snippets.
//!
//! External sites drop one `<script>` tag onto a page; the snippet calls
//! back into the JSONP feed and renders a schedule table in place.

use axum::http::header;
use axum::response::{IntoResponse, Response};

const EMBEDDABLE_SCHEDULE_JS: &str = r#"(function () {
  var script = document.currentScript;
  var seminar = script.getAttribute("data-seminar");
  var base = script.getAttribute("data-base") || "";
  if (!seminar) {
    return;
  }
  var target = document.createElement("div");
  target.className = "colloquia-schedule";
  script.parentNode.insertBefore(target, script);

  window.__colloquiaRenderSchedule = function (talks) {
    var table = document.createElement("table");
    for (var i = 0; i < talks.length; i++) {
      var talk = talks[i];
      var row = table.insertRow(-1);
      row.insertCell(-1).textContent = new Date(talk.start_time).toLocaleString();
      row.insertCell(-1).textContent = talk.speaker;
      row.insertCell(-1).textContent = talk.title;
    }
    target.appendChild(table);
  };

  var loader = document.createElement("script");
  loader.src =
    base +
    "/seminar/" +
    encodeURIComponent(seminar) +
    "/json?daterange=future&callback=__colloquiaRenderSchedule";
  document.head.appendChild(loader);
})();
"#;

const EMBED_SEMINARS_JS: &str = r#"(function () {
  var script = document.currentScript;
  var seminar = script.getAttribute("data-seminar");
  var base = script.getAttribute("data-base") || "";
  var daterange = script.getAttribute("data-daterange") || "";
  if (!seminar) {
    return;
  }
  var target = document.createElement("div");
  target.className = "colloquia-embed";
  script.parentNode.insertBefore(target, script);

  var url =
    base + "/seminar/" + encodeURIComponent(seminar) + "/json";
  if (daterange) {
    url += "?daterange=" + encodeURIComponent(daterange);
  }
  var request = new XMLHttpRequest();
  request.open("GET", url);
  request.onload = function () {
    if (request.status !== 200) {
      return;
    }
    var talks = JSON.parse(request.responseText);
    var list = document.createElement("ul");
    for (var i = 0; i < talks.length; i++) {
      var talk = talks[i];
      var item = document.createElement("li");
      item.textContent =
        new Date(talk.start_time).toLocaleString() +
        " | " +
        talk.speaker +
        " | " +
        talk.title;
      list.appendChild(item);
    }
    target.appendChild(list);
  };
  request.send();
})();
"#;

pub async fn embeddable_schedule() -> Response {
    js_response(EMBEDDABLE_SCHEDULE_JS)
}

pub async fn embed_seminars() -> Response {
    js_response(EMBED_SEMINARS_JS)
}

fn js_response(body: &'static str) -> Response {
    (
        [(
            header::CONTENT_TYPE,
            "text/javascript; charset=utf-8".to_string(),
        )],
        body,
    )
        .into_response()
}
