//! Benchmarks for virtual code generation.
//!
//! Run with: cargo bench -p vellum_virtual

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use vellum_virtual::LanguageSession;

// =============================================================================
// Test Data
// =============================================================================

const SIMPLE_SFC: &str = r#"<template>
  <button @click="count++">{{ count }}</button>
</template>

<script setup lang="ts">
import { ref } from 'vue'
const count = ref(0)
</script>
"#;

const MEDIUM_SFC: &str = r#"<template>
  <div class="list" :class="{ active }">
    <TodoItem
      v-for="(todo, index) in todos"
      :key="todo.id"
      :todo="todo"
      @remove="remove(index)"
    >
      <template #label="{ text }">
        <span class="label">{{ text.toUpperCase() }}</span>
      </template>
    </TodoItem>
    <p v-if="todos.length === 0">Nothing to do</p>
    <p v-else-if="done">All done</p>
    <p v-else>{{ todos.length }} left</p>
    <input ref="input" v-model="draft" v-focus>
  </div>
</template>

<script>
import TodoItem from './TodoItem.vue'
export default {
  components: { TodoItem },
  directives: { focus: {} },
}
</script>

<script setup lang="ts">
import { computed, ref } from 'vue'
const todos = ref<{ id: number; text: string }[]>([])
const draft = ref('')
const active = ref(false)
const done = computed(() => todos.value.length > 0)
function remove(index: number) {
  todos.value.splice(index, 1)
}
</script>

<style scoped>
.list { color: v-bind(color); }
.label { font-weight: bold; }
</style>
"#;

const PUG_SFC: &str = r#"<template lang="pug">
  div.list(:class="{ active }")
    TodoItem(
      v-for="todo in todos"
      :key="todo.id"
      :todo="todo"
    )
    p(v-if="todos.length === 0") Nothing to do
    p(v-else) {{ todos.length }} left
</template>

<script setup lang="ts">
const todos = []
const active = false
</script>
"#;

/// Many sibling elements for stress testing
fn generate_large_sfc() -> String {
    let rows: String = (0..200)
        .map(|i| {
            format!(
                "    <Row :id=\"items[{i}].id\" :class=\"{{ selected: selected === {i} }}\" @click=\"select({i})\">{{{{ items[{i}].label }}}}</Row>\n"
            )
        })
        .collect();
    format!(
        "<template>\n  <div>\n{rows}  </div>\n</template>\n\n<script setup lang=\"ts\">\nconst items = []\nconst selected = 0\nfunction select(i: number) {{}}\n</script>\n"
    )
}

// =============================================================================
// Benchmarks
// =============================================================================

fn bench_generate_simple(c: &mut Criterion) {
    let session = LanguageSession::default();
    let mut group = c.benchmark_group("generate");
    group.throughput(Throughput::Bytes(SIMPLE_SFC.len() as u64));

    group.bench_function("simple", |b| {
        b.iter(|| {
            let code = session.create_virtual_code("App.vue", black_box(SIMPLE_SFC));
            black_box(code);
        })
    });

    group.finish();
}

fn bench_generate_medium(c: &mut Criterion) {
    let session = LanguageSession::default();
    let mut group = c.benchmark_group("generate");
    group.throughput(Throughput::Bytes(MEDIUM_SFC.len() as u64));

    group.bench_function("medium", |b| {
        b.iter(|| {
            let code = session.create_virtual_code("App.vue", black_box(MEDIUM_SFC));
            black_box(code);
        })
    });

    group.finish();
}

fn bench_generate_pug(c: &mut Criterion) {
    let session = LanguageSession::default();
    let mut group = c.benchmark_group("generate");
    group.throughput(Throughput::Bytes(PUG_SFC.len() as u64));

    group.bench_function("pug", |b| {
        b.iter(|| {
            let code = session.create_virtual_code("App.vue", black_box(PUG_SFC));
            black_box(code);
        })
    });

    group.finish();
}

fn bench_generate_large(c: &mut Criterion) {
    let session = LanguageSession::default();
    let source = generate_large_sfc();
    let mut group = c.benchmark_group("generate");
    group.throughput(Throughput::Bytes(source.len() as u64));

    group.bench_function("large", |b| {
        b.iter(|| {
            let code = session.create_virtual_code("App.vue", black_box(&source));
            black_box(code);
        })
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_generate_simple,
    bench_generate_medium,
    bench_generate_pug,
    bench_generate_large,
);
criterion_main!(benches);
